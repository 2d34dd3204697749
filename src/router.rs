//! Identifier routing.
//!
//! Maps an incoming standard identifier onto a motor slot of the node's owned table.
//! Only the role's inbound range is recognized; every other identifier, including the
//! node's own outbound range, is [`Route::Unrecognized`].

use crate::config::RoleConfig;
use crate::motor::MotorIndex;
use crate::pdo::PdoKind;
use embedded_can::StandardId;

/// Where a received frame goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Into the owned table.
    Inbound {
        /// Record carried by the frame.
        kind: PdoKind,
        /// Target slot.
        slot: MotorIndex,
    },
    /// Into the diagnostic snapshot.
    Unrecognized,
}

/// Resolves the final slot of an inbound record.
///
/// The index embedded in the payload wins whenever it names a valid slot. An absent or
/// out-of-range embedded index falls back to the identifier-derived slot.
pub fn resolve_slot(from_identifier: MotorIndex, embedded: Option<u32>) -> MotorIndex {
    embedded.and_then(MotorIndex::new).unwrap_or(from_identifier)
}

/// Identifier classifier for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Router {
    kind: PdoKind,
    base: u16,
}

impl Router {
    /// Router for the inbound direction of `config`.
    pub const fn new(config: &RoleConfig) -> Self {
        let kind = config.role().inbound();
        Self {
            kind,
            base: config.base(kind),
        }
    }

    /// Classifies by identifier alone; the slot is `identifier - base`.
    pub fn classify(&self, id: StandardId) -> Route {
        let offset = id.as_raw().checked_sub(self.base);
        match offset.and_then(|o| MotorIndex::new(u32::from(o))) {
            Some(slot) => Route::Inbound {
                kind: self.kind,
                slot,
            },
            None => Route::Unrecognized,
        }
    }

    /// Classifies and applies the embedded-index precedence rule (see [`resolve_slot`]).
    pub fn route(&self, id: StandardId, embedded: Option<u32>) -> Route {
        match self.classify(id) {
            Route::Inbound { kind, slot } => Route::Inbound {
                kind,
                slot: resolve_slot(slot, embedded),
            },
            Route::Unrecognized => Route::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u16) -> StandardId {
        StandardId::new(raw).unwrap()
    }

    fn slot(raw: u32) -> MotorIndex {
        MotorIndex::new(raw).unwrap()
    }

    #[test]
    fn test_identifier_offset_without_embedded_index() {
        let router = Router::new(&RoleConfig::hub());
        for offset in 0..15u16 {
            assert_eq!(
                router.route(id(0x200 + offset), None),
                Route::Inbound {
                    kind: PdoKind::Telemetry,
                    slot: slot(u32::from(offset))
                }
            );
        }
    }

    #[test]
    fn test_embedded_index_wins() {
        let router = Router::new(&RoleConfig::satellite());
        for offset in 0..15u16 {
            for embedded in 0..15u32 {
                assert_eq!(
                    router.route(id(0x300 + offset), Some(embedded)),
                    Route::Inbound {
                        kind: PdoKind::Command,
                        slot: slot(embedded)
                    }
                );
            }
        }
    }

    #[test]
    fn test_out_of_range_embedded_index_falls_back() {
        let router = Router::new(&RoleConfig::hub());
        assert_eq!(
            router.route(id(0x209), Some(15)),
            Route::Inbound {
                kind: PdoKind::Telemetry,
                slot: slot(9)
            }
        );
        assert_eq!(resolve_slot(slot(4), Some(u32::MAX)), slot(4));
    }

    #[test]
    fn test_outside_inbound_range_is_unrecognized() {
        let hub = Router::new(&RoleConfig::hub());
        assert_eq!(hub.classify(id(0x1ff)), Route::Unrecognized);
        assert_eq!(hub.classify(id(0x20f)), Route::Unrecognized);
        assert_eq!(hub.classify(id(0x2ff)), Route::Unrecognized);
        // a hub does not ingest command frames
        assert_eq!(hub.route(id(0x300), Some(0)), Route::Unrecognized);
        assert_eq!(hub.classify(id(0x000)), Route::Unrecognized);
    }
}
