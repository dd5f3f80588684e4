use super::MessageType;

/// The deprecated control field of the header, kept for version 1 hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlField {
    Sync,
    DelayReq,
    FollowUp,
    DelayResp,
    Management,
    AllOthers,
}

impl ControlField {
    pub(crate) fn to_primitive(self) -> u8 {
        match self {
            ControlField::Sync => 0x00,
            ControlField::DelayReq => 0x01,
            ControlField::FollowUp => 0x02,
            ControlField::DelayResp => 0x03,
            ControlField::Management => 0x04,
            ControlField::AllOthers => 0x05,
        }
    }
}

impl From<MessageType> for ControlField {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::Sync => ControlField::Sync,
            MessageType::DelayReq => ControlField::DelayReq,
            MessageType::FollowUp => ControlField::FollowUp,
            MessageType::DelayResp => ControlField::DelayResp,
            MessageType::Management => ControlField::Management,
            _ => ControlField::AllOthers,
        }
    }
}
