use std::sync::Mutex;

use pageflow::errors::Result;
use pageflow::serve::{DevServer, ReloadOptions, ServeOptions};

/// `DevServer` that only records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingDevServer {
    inits: Mutex<Vec<ServeOptions>>,
    reloads: Mutex<Vec<ReloadOptions>>,
}

impl RecordingDevServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inits(&self) -> Vec<ServeOptions> {
        self.inits.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> Vec<ReloadOptions> {
        self.reloads.lock().unwrap().clone()
    }
}

impl DevServer for RecordingDevServer {
    fn init(&self, options: ServeOptions) -> Result<()> {
        self.inits.lock().unwrap().push(options);
        Ok(())
    }

    fn reload(&self, options: ReloadOptions) {
        self.reloads.lock().unwrap().push(options);
    }
}
