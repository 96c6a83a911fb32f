//! Operation-type codes carried in the envelope's `type` field.

use std::fmt;

macro_rules! message_kinds {
    ($($variant:ident = $code:literal),+ $(,)?) => {
        /// Logical message kind, keyed by the envelope's operation-type code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MessageKind {
            $($variant,)+
            /// A code this client has no name for.
            Unknown(u32),
        }

        impl MessageKind {
            /// Every named kind, in code order.
            pub const ALL: &'static [MessageKind] = &[$(MessageKind::$variant,)+];

            pub fn from_code(code: u32) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }

            pub fn code(self) -> u32 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => code,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                    Self::Unknown(_) => "Unknown",
                }
            }
        }
    };
}

message_kinds! {
    NoOperation = 0,
    SetAddressRequest = 1,
    RegisterAppRequest = 2,
    StartSessionRequest = 3,
    CloseSessionRequest = 4,
    ListRegisteredAppsRequest = 5,
    DeregisterAppRequest = 6,
    ChangePinRequest = 7,
    GetRemoteAccessIdRequest = 8,
    SetRemoteAccessIdRequest = 9,
    GetSupportIdRequest = 10,
    SetSupportIdRequest = 11,
    GetWebIdRequest = 12,
    SetWebIdRequest = 13,
    SetPushIdRequest = 14,
    DebugRequest = 15,
    UpgradeRequest = 16,
    SetDeviceSettingsRequest = 17,
    VersionRequest = 18,
    CnTimeRequest = 30,
    CnTimeConfirm = 31,
    CnNodeNotification = 32,
    CnRmiRequest = 33,
    CnRmiResponse = 34,
    CnRmiAsyncRequest = 35,
    CnRmiAsyncConfirm = 36,
    CnRmiAsyncResponse = 37,
    CnRpdoRequest = 38,
    CnRpdoConfirm = 39,
    CnRpdoNotification = 40,
    CnAlarmNotification = 41,
    CnNodeRequest = 42,
    SetAddressConfirm = 51,
    RegisterAppConfirm = 52,
    StartSessionConfirm = 53,
    CloseSessionConfirm = 54,
    ListRegisteredAppsConfirm = 55,
    DeregisterAppConfirm = 56,
    ChangePinConfirm = 57,
    DebugConfirm = 65,
    UpgradeConfirm = 66,
    VersionConfirm = 68,
    GatewayNotification = 100,
    KeepAlive = 101,
}

impl MessageKind {
    /// The wire value of the envelope's `type` field.
    pub fn wire_code(self) -> i32 {
        i32::try_from(self.code()).unwrap_or(i32::MAX)
    }

    /// Kind from the envelope's `type` field. Negative values are unknown.
    pub fn from_wire(code: i32) -> Self {
        u32::try_from(code).map_or(Self::Unknown(u32::MAX), Self::from_code)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown({code})"),
            other => f.write_str(other.name()),
        }
    }
}
