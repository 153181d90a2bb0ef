/// Runtime configuration for token verification.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Allowable clock skew in seconds when validating exp.
    ///
    /// Defaults to zero: tokens here live for about a minute, so even a
    /// small leeway would extend their life noticeably.
    pub leeway_seconds: u32,
}

impl JwtConfig {
    pub fn new() -> Self {
        Self { leeway_seconds: 0 }
    }

    /// Adjust the allowed leeway for deployments with clock skew.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::new()
    }
}
