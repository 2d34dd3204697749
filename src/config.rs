//! Role configuration for a node.
//!
//! The hub and the satellites run the same [`Node`](crate::node::Node); what differs is
//! captured in a [`RoleConfig`] value:
//!
//! - which record the node receives (and therefore owns) and which it sends,
//! - the identifier base of each direction,
//! - how timer ticks are consumed.
//!
//! A `RoleConfig` can only be obtained through a validating constructor, so identifier
//! ranges are known to fit the 11-bit space and to be disjoint before any frame is routed.

use crate::consts::{DEFAULT_COMMAND_BASE, DEFAULT_TELEMETRY_BASE, NUM_MOTORS_U16, STD_ID_MASK};
use crate::pdo::PdoKind;
use crate::timer::TickModel;
use thiserror::Error;

/// Which end of the link a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Central node: ingests telemetry, emits commands.
    Hub,
    /// Motor-side node: ingests commands, emits telemetry.
    Satellite,
}

impl Role {
    /// The record this role receives into its owned table.
    pub const fn inbound(self) -> PdoKind {
        match self {
            Role::Hub => PdoKind::Telemetry,
            Role::Satellite => PdoKind::Command,
        }
    }

    /// The record this role writes locally and transmits.
    pub const fn outbound(self) -> PdoKind {
        match self {
            Role::Hub => PdoKind::Command,
            Role::Satellite => PdoKind::Telemetry,
        }
    }

    /// Short lowercase name, for log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Hub => "hub",
            Role::Satellite => "satellite",
        }
    }
}

/// Rejected identifier layouts.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `base + 14` does not fit in an 11-bit identifier.
    #[error("identifier range starting at {base:#05x} runs past 0x7ff")]
    RangeOverflow {
        /// The offending base.
        base: u16,
    },
    /// The telemetry and command ranges share at least one identifier.
    #[error("telemetry range at {telemetry:#05x} overlaps command range at {command:#05x}")]
    Overlap {
        /// Telemetry base.
        telemetry: u16,
        /// Command base.
        command: u16,
    },
}

/// Validated per-role settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleConfig {
    role: Role,
    telemetry_base: u16,
    command_base: u16,
    tick_model: TickModel,
}

const LAST_VALID_BASE: u16 = STD_ID_MASK - (NUM_MOTORS_U16 - 1);

impl RoleConfig {
    /// Validates and builds a configuration.
    ///
    /// # Errors
    /// - [`ConfigError::RangeOverflow`] if either range leaves the 11-bit identifier space
    /// - [`ConfigError::Overlap`] if the two ranges intersect
    pub const fn new(
        role: Role,
        telemetry_base: u16,
        command_base: u16,
        tick_model: TickModel,
    ) -> Result<Self, ConfigError> {
        if telemetry_base > LAST_VALID_BASE {
            return Err(ConfigError::RangeOverflow {
                base: telemetry_base,
            });
        }
        if command_base > LAST_VALID_BASE {
            return Err(ConfigError::RangeOverflow { base: command_base });
        }
        let span = NUM_MOTORS_U16 - 1;
        if telemetry_base <= command_base + span && command_base <= telemetry_base + span {
            return Err(ConfigError::Overlap {
                telemetry: telemetry_base,
                command: command_base,
            });
        }
        Ok(Self {
            role,
            telemetry_base,
            command_base,
            tick_model,
        })
    }

    /// Hub with the default bases (telemetry 0x200, commands 0x300), counting ticks.
    pub const fn hub() -> Self {
        Self {
            role: Role::Hub,
            telemetry_base: DEFAULT_TELEMETRY_BASE,
            command_base: DEFAULT_COMMAND_BASE,
            tick_model: TickModel::Counting,
        }
    }

    /// Satellite with the default bases, using the pending-flag tick model.
    pub const fn satellite() -> Self {
        Self {
            role: Role::Satellite,
            telemetry_base: DEFAULT_TELEMETRY_BASE,
            command_base: DEFAULT_COMMAND_BASE,
            tick_model: TickModel::Pending,
        }
    }

    /// Same configuration with a different tick model.
    pub const fn with_tick_model(mut self, tick_model: TickModel) -> Self {
        self.tick_model = tick_model;
        self
    }

    /// This node's role.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// First identifier of the telemetry range.
    pub const fn telemetry_base(&self) -> u16 {
        self.telemetry_base
    }

    /// First identifier of the command range.
    pub const fn command_base(&self) -> u16 {
        self.command_base
    }

    /// First identifier of the range for `kind`.
    pub const fn base(&self, kind: PdoKind) -> u16 {
        match kind {
            PdoKind::Telemetry => self.telemetry_base,
            PdoKind::Command => self.command_base,
        }
    }

    /// How ticks are consumed on this node.
    pub const fn tick_model(&self) -> TickModel {
        self.tick_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let hub = RoleConfig::hub();
        assert_eq!(
            RoleConfig::new(Role::Hub, 0x200, 0x300, TickModel::Counting),
            Ok(hub)
        );
        let satellite = RoleConfig::satellite();
        assert_eq!(
            RoleConfig::new(Role::Satellite, 0x200, 0x300, TickModel::Pending),
            Ok(satellite)
        );
        assert_eq!(hub.role().inbound(), PdoKind::Telemetry);
        assert_eq!(satellite.role().inbound(), PdoKind::Command);
        assert_eq!(satellite.base(PdoKind::Telemetry), 0x200);
        assert_eq!(hub.base(PdoKind::Command), 0x300);
    }

    #[test]
    fn test_rejects_overlap() {
        assert_eq!(
            RoleConfig::new(Role::Hub, 0x200, 0x20e, TickModel::Counting),
            Err(ConfigError::Overlap {
                telemetry: 0x200,
                command: 0x20e
            })
        );
        assert_eq!(
            RoleConfig::new(Role::Hub, 0x30e, 0x300, TickModel::Counting),
            Err(ConfigError::Overlap {
                telemetry: 0x30e,
                command: 0x300
            })
        );
        assert!(RoleConfig::new(Role::Hub, 0x200, 0x20f, TickModel::Counting).is_ok());
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(RoleConfig::new(Role::Hub, 0x7f1, 0x100, TickModel::Counting).is_ok());
        assert_eq!(
            RoleConfig::new(Role::Hub, 0x7f2, 0x100, TickModel::Counting),
            Err(ConfigError::RangeOverflow { base: 0x7f2 })
        );
        assert_eq!(
            RoleConfig::new(Role::Satellite, 0x100, 0x7ff, TickModel::Pending),
            Err(ConfigError::RangeOverflow { base: 0x7ff })
        );
    }

    #[test]
    fn test_with_tick_model() {
        let config = RoleConfig::satellite().with_tick_model(TickModel::Counting);
        assert_eq!(config.tick_model(), TickModel::Counting);
        assert_eq!(config.role(), Role::Satellite);
    }
}
