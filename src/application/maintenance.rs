//! # Maintenance Gate
//!
//! Operator switches consulted before every dispatch. Admins toggle them with
//! text commands and are never gated themselves.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::command::{Command, CommandKind};
use crate::domain::config::SettingsConfig;
use crate::domain::types::GateFlags;
use crate::strings::messages;

pub const MAINTENANCE_ON: &str = "/maintenance_on";
pub const MAINTENANCE_OFF: &str = "/maintenance_off";
pub const OFFLINE_ON: &str = "/offline_on";
pub const OFFLINE_OFF: &str = "/offline_off";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    Open,
    /// Drop without a reply.
    Offline,
    /// Reply with the maintenance notice and drop.
    Maintenance,
    /// An admin toggled a flag; the command is consumed.
    Toggled(&'static str),
}

#[derive(Debug, Default)]
pub struct MaintenanceGate {
    offline: AtomicBool,
    maintenance: AtomicBool,
    admins: Vec<String>,
}

impl MaintenanceGate {
    pub fn new(offline: bool, maintenance: bool, admins: Vec<String>) -> Self {
        Self {
            offline: AtomicBool::new(offline),
            maintenance: AtomicBool::new(maintenance),
            admins,
        }
    }

    pub fn from_settings(settings: &SettingsConfig) -> Self {
        Self::new(settings.offline, settings.maintenance, settings.admins.clone())
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::Relaxed)
    }

    pub fn is_maintenance(&self) -> bool {
        self.maintenance.load(Ordering::Relaxed)
    }

    pub fn set_offline(&self, value: bool) {
        self.offline.store(value, Ordering::Relaxed);
    }

    pub fn set_maintenance(&self, value: bool) {
        self.maintenance.store(value, Ordering::Relaxed);
    }

    pub fn flags(&self) -> GateFlags {
        GateFlags {
            offline: self.is_offline(),
            maintenance: self.is_maintenance(),
        }
    }

    pub fn apply(&self, flags: GateFlags) {
        self.set_offline(flags.offline);
        self.set_maintenance(flags.maintenance);
    }

    pub fn is_admin(&self, chat_id: &str) -> bool {
        self.admins.iter().any(|a| a == chat_id)
    }

    pub fn check(&self, chat_id: &str, command: &Command) -> GateVerdict {
        if self.is_admin(chat_id) {
            if command.kind() == CommandKind::TextInput {
                let toggled = match command.input().trim() {
                    MAINTENANCE_ON => {
                        self.set_maintenance(true);
                        Some(messages::MAINTENANCE_ENABLED)
                    }
                    MAINTENANCE_OFF => {
                        self.set_maintenance(false);
                        Some(messages::MAINTENANCE_DISABLED)
                    }
                    OFFLINE_ON => {
                        self.set_offline(true);
                        Some(messages::OFFLINE_ENABLED)
                    }
                    OFFLINE_OFF => {
                        self.set_offline(false);
                        Some(messages::OFFLINE_DISABLED)
                    }
                    _ => None,
                };
                if let Some(reply) = toggled {
                    tracing::info!(chat_id, reply, "admin toggled gate");
                    return GateVerdict::Toggled(reply);
                }
            }
            return GateVerdict::Open;
        }

        if self.is_offline() {
            GateVerdict::Offline
        } else if self.is_maintenance() {
            GateVerdict::Maintenance
        } else {
            GateVerdict::Open
        }
    }
}
