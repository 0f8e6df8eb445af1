//! Error types.

/// Config bringup error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither the command line nor the config file names a profile.
    #[error("no profile selected")]
    NoProfileSelected,

    /// The selected profile does not exist.
    #[error("profile \"{0}\" not found")]
    UnknownProfile(String),

    /// The profile has no hostname.
    #[error("profile \"{profile}\": missing hostname")]
    MissingHost {
        /// The profile name.
        profile: String,
    },

    /// The profile has no user and none was given.
    #[error("profile \"{profile}\": missing user")]
    MissingUser {
        /// The profile name.
        profile: String,
    },

    /// The profile has no password and none was given.
    #[error("profile \"{profile}\": missing password")]
    MissingPassword {
        /// The profile name.
        profile: String,
    },

    /// The port is zero.
    #[error("profile \"{profile}\": invalid port 0")]
    InvalidPort {
        /// The profile name.
        profile: String,
    },

    /// The period is zero seconds.
    #[error("profile \"{profile}\": period must be positive")]
    ZeroPeriod {
        /// The profile name.
        profile: String,
    },

    /// The period is `true` without a number of seconds.
    #[error("profile \"{profile}\": period must be a number of seconds or false")]
    PeriodWithoutSeconds {
        /// The profile name.
        profile: String,
    },
}
