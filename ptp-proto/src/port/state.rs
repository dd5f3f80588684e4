use core::fmt::{Display, Formatter};

/// The states of the port state machine (IEEE 1588-2008 section 9.2.5)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PortState {
    #[default]
    Initializing,
    Faulty,
    Disabled,
    Listening,
    PreMaster,
    Master,
    Passive,
    Uncalibrated,
    Slave,
}

impl PortState {
    /// States in which the port takes part in the protocol
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            PortState::Initializing | PortState::Faulty | PortState::Disabled
        )
    }

    /// States in which the port follows a master
    pub fn is_slave(self) -> bool {
        matches!(self, PortState::Uncalibrated | PortState::Slave)
    }
}

impl Display for PortState {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            PortState::Initializing => "Initializing",
            PortState::Faulty => "Faulty",
            PortState::Disabled => "Disabled",
            PortState::Listening => "Listening",
            PortState::PreMaster => "Pre-Master",
            PortState::Master => "Master",
            PortState::Passive => "Passive",
            PortState::Uncalibrated => "Uncalibrated",
            PortState::Slave => "Slave",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(PortState::PreMaster.to_string(), "Pre-Master");
        assert_eq!(PortState::Uncalibrated.to_string(), "Uncalibrated");
    }

    #[test]
    fn activity() {
        assert!(!PortState::Faulty.is_active());
        assert!(PortState::Passive.is_active());
        assert!(PortState::Uncalibrated.is_slave());
        assert!(!PortState::Master.is_slave());
    }
}
