use std::fmt;

/// Result code carried in every operation envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    BadRequest,
    InternalError,
    NotReachable,
    OtherSession,
    NotAllowed,
    NoResources,
    NotExist,
    RmiError,
    /// Any code this client does not recognize.
    Unknown,
}

impl ResultCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::BadRequest,
            2 => Self::InternalError,
            3 => Self::NotReachable,
            4 => Self::OtherSession,
            5 => Self::NotAllowed,
            6 => Self::NoResources,
            7 => Self::NotExist,
            8 => Self::RmiError,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "BAD_REQUEST",
            Self::InternalError => "INTERNAL_ERROR",
            Self::NotReachable => "NOT_REACHABLE",
            Self::OtherSession => "OTHER_SESSION",
            Self::NotAllowed => "NOT_ALLOWED",
            Self::NoResources => "NO_RESOURCES",
            Self::NotExist => "NOT_EXIST",
            Self::RmiError => "RMI_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
