pub mod cli_consts {
    //! Client Configuration Constants
    //!
    //! This module contains all configuration constants for the dashboard client,
    //! organized by functional area for clarity and maintainability.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// The maximum number of events to keep in the activity log.
    pub const MAX_ACTIVITY_LOGS: usize = 100;

    /// Maximum event buffer size between the API runtime and the UI.
    pub const EVENT_QUEUE_SIZE: usize = 100;

    /// Maximum buffered commands from the UI to the API runtime.
    pub const COMMAND_QUEUE_SIZE: usize = 32;

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    /// HTTP client timing for the tracker service.
    pub mod http {
        use std::time::Duration;

        /// Timeout for establishing a connection (seconds).
        pub const CONNECT_TIMEOUT_SECS: u64 = 10;

        /// Timeout for a complete request (seconds).
        pub const REQUEST_TIMEOUT_SECS: u64 = 10;

        /// Helper function to get the connect timeout
        pub const fn connect_timeout() -> Duration {
            Duration::from_secs(CONNECT_TIMEOUT_SECS)
        }

        /// Helper function to get the request timeout
        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }
    }

    // =============================================================================
    // UI CONFIGURATION
    // =============================================================================

    /// Terminal event loop timing.
    pub mod ui {
        use std::time::Duration;

        /// How long to poll for a key event before redrawing (milliseconds).
        pub const KEY_POLL_INTERVAL_MS: u64 = 100;

        /// Helper function to get the key poll interval
        pub const fn key_poll_interval() -> Duration {
            Duration::from_millis(KEY_POLL_INTERVAL_MS)
        }
    }

    /// Headless mode timing.
    pub mod headless {
        use std::time::Duration;

        /// Default interval between snapshot refreshes (seconds).
        pub const DEFAULT_REFRESH_SECS: u64 = 60;

        /// Helper function to build the refresh interval
        pub const fn refresh_interval(secs: u64) -> Duration {
            Duration::from_secs(secs)
        }
    }
}
