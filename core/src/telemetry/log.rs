use log::{debug, info};

/// Thin wrapper over the `log` facade shared by the regridding components.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!("{}: {}", self.component, message);
    }

    pub fn detail(&self, message: &str) {
        debug!("{}: {}", self.component, message);
    }

    /// Logs the shape change performed by one call.
    pub fn record_shapes(&self, input: &[usize], output: &[usize]) {
        self.record(&format!("{:?} -> {:?}", input, output));
    }
}
