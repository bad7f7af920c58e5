use std::time::Instant;
use std::sync::Arc;
use parking_lot::Mutex;

/// Timestamped console logger that also keeps every line it printed.
#[derive(Clone)]
pub struct Logger {
    messages: Arc<Mutex<Vec<String>>>,
}

impl Logger {
    pub fn new(log_messages: Arc<Mutex<Vec<String>>>) -> Self {
        Logger { messages: log_messages }
    }

    pub fn log(&self, message: String) {
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        let log_message = format!("[{}] {}", timestamp, message);
        println!("{}", log_message);
        self.messages.lock().push(log_message);
    }

    /// Snapshot of everything logged so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|line| line.contains(needle))
    }

    /// Run `f` and log how long `label` took.
    pub fn timed<F, T>(&self, label: &str, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = f();
        self.log(format!("{} took {:?}", label, start.elapsed()));
        result
    }

    pub fn log_memory(&self, stage: &str) {
        match sys_info::mem_info() {
            Ok(mem) => self.log(format!(
                "Memory {}: {} MB used of {} MB",
                stage,
                mem.total.saturating_sub(mem.avail) / 1024,
                mem.total / 1024
            )),
            Err(e) => self.log(format!("Memory {}: unavailable ({})", stage, e)),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(Arc::new(Mutex::new(Vec::new())))
    }
}
