use tracing::{Event, Level, Subscriber};
use tracing_log::NormalizeEvent;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "warn,spinwin=info,backend=info,shared=info";

#[derive(Default)]
struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        }
    }
}

// Level, target and message of an event. Records bridged from the `log`
// facade report their original target rather than `log`.
fn describe(event: &Event<'_>) -> Option<(Level, String, String)> {
    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);
    if visitor.0.is_empty() {
        return None;
    }

    let normalized = event.normalized_metadata();
    let metadata = normalized.as_ref().unwrap_or_else(|| event.metadata());
    Some((*metadata.level(), metadata.target().to_string(), visitor.0))
}

struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Some((level, target, message)) = describe(event) else {
            return;
        };

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        match level {
            Level::ERROR => eprintln!("[{}] ERROR {} - {}", timestamp, target, message),
            Level::WARN => eprintln!("[{}] WARN  {} - {}", timestamp, target, message),
            Level::INFO => println!("[{}] INFO  {} - {}", timestamp, target, message),
            _ => println!("[{}] DEBUG {} - {}", timestamp, target, message),
        }
    }
}

/// Installs the global subscriber and forwards `log` records from the game
/// rules into it. `RUST_LOG` overrides the default filter.
pub fn setup() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = Registry::default().with(env_filter).with(ConsoleLayer).try_init();
    if let Err(e) = result {
        eprintln!("logging already initialised: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<(Level, String, String)>>>);

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if let Some(line) = describe(event) {
                self.0.lock().unwrap().push(line);
            }
        }
    }

    #[test]
    fn test_bridged_log_record_keeps_its_target() {
        let capture = Capture::default();
        let subscriber = Registry::default().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            let record = log::Record::builder()
                .args(format_args!("wheel settled"))
                .level(log::Level::Info)
                .target("shared::shared_wheel_game")
                .build();
            tracing_log::format_trace(&record).unwrap();
            tracing::warn!(target: "backend::services::economy", "failed to save balances");
        });

        let lines = capture.0.lock().unwrap();
        assert_eq!(
            *lines,
            vec![
                (Level::INFO, "shared::shared_wheel_game".to_string(), "wheel settled".to_string()),
                (Level::WARN, "backend::services::economy".to_string(), "failed to save balances".to_string()),
            ]
        );
    }
}
