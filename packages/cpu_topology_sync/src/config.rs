use tracing::level_filters::LevelFilter;

/// Boot argument that enables verbose logging for this crate only.
pub const VERBOSE_FLAG: &str = "-ctsdbg";

/// Boot argument that enables verbose logging for every plugin of the hosting framework.
pub const VERBOSE_ALL_FLAG: &str = "-liludbgall";

/// Boot argument key whose value is the delay after each log message, in microseconds.
pub const PRINT_DELAY_KEY: &str = "liludelay";

/// Logging options taken from the kernel boot arguments.
///
/// These are the only user-facing knobs. They are consumed by whoever installs the `tracing`
/// subscriber; topology correction itself behaves the same regardless.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DebugOptions {
    verbose: bool,
    print_delay_micros: u32,
}

impl DebugOptions {
    /// Parses a whitespace-separated boot argument string such as
    /// `"keepsyms=1 -ctsdbg liludelay=1000"`.
    ///
    /// Unknown arguments are ignored, as is a print delay that is not a `u32`.
    #[must_use]
    pub fn from_boot_args(boot_args: &str) -> Self {
        let mut options = Self::default();

        for argument in boot_args.split_ascii_whitespace() {
            match argument.split_once('=') {
                None if argument == VERBOSE_FLAG || argument == VERBOSE_ALL_FLAG => {
                    options.verbose = true;
                }
                Some((PRINT_DELAY_KEY, value)) => match value.parse() {
                    Ok(delay) => options.print_delay_micros = delay,
                    Err(error) => {
                        tracing::warn!(value, %error, "ignoring malformed print delay");
                    }
                },
                _ => {}
            }
        }

        options
    }

    /// Whether verbose (debug-level) logging was requested.
    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// How long to pause after each log message, in microseconds.
    #[must_use]
    pub const fn print_delay_micros(&self) -> u32 {
        self.print_delay_micros
    }

    /// The most verbose level the subscriber should record.
    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }
}
