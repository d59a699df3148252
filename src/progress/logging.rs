use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Mirrors build progress into tracing: phase timings at debug, the outcome at info
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { program } => info!(program = %program, "Build started"),
            ProgressEvent::PhaseStarted { phase } => debug!(phase = %phase, "Phase started"),
            ProgressEvent::PhaseComplete { phase, duration } => {
                debug!(phase = %phase, duration_ms = duration.as_millis(), "Phase finished")
            }
            ProgressEvent::ValidationComplete { warnings, errors } if *errors > 0 => {
                warn!(errors, warnings, "Diagnostics contain errors")
            }
            ProgressEvent::ValidationComplete { warnings, .. } => {
                debug!(warnings, "Diagnostics contain no errors")
            }
            ProgressEvent::Completed {
                artifacts,
                total_time,
            } => info!(
                artifacts,
                duration_ms = total_time.as_millis(),
                "Build finished"
            ),
            ProgressEvent::Failed { error } => warn!(error = %error, "Build aborted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(level: tracing::Level, events: &[ProgressEvent]) -> String {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(out.clone())
            .with_max_level(level)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            for event in events {
                LoggingHandler.on_progress(event);
            }
        });
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_phase_timings_only_at_debug() {
        let events = [
            ProgressEvent::Started {
                program: "acme/hello:1.0.0".to_string(),
            },
            ProgressEvent::PhaseComplete {
                phase: "Synthesize".to_string(),
                duration: Duration::from_millis(2),
            },
            ProgressEvent::Completed {
                artifacts: 5,
                total_time: Duration::from_millis(9),
            },
        ];

        let info = capture(tracing::Level::INFO, &events);
        assert!(info.contains("Build started"));
        assert!(info.contains("program=acme/hello:1.0.0"));
        assert!(info.contains("artifacts=5"));
        assert!(!info.contains("Phase finished"));

        let debug = capture(tracing::Level::DEBUG, &events);
        assert!(debug.contains("Phase finished"));
        assert!(debug.contains("phase=Synthesize"));
        assert!(debug.contains("duration_ms=2"));
    }

    #[test]
    fn test_errors_and_failures_are_warnings() {
        let events = [
            ProgressEvent::ValidationComplete {
                warnings: 2,
                errors: 0,
            },
            ProgressEvent::ValidationComplete {
                warnings: 0,
                errors: 1,
            },
            ProgressEvent::Failed {
                error: "Build session for 'hello' already exists".to_string(),
            },
        ];

        let output = capture(tracing::Level::WARN, &events);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("WARN"));
        assert!(lines[0].contains("Diagnostics contain errors"));
        assert!(lines[0].contains("errors=1"));
        assert!(lines[1].contains("Build aborted"));
        assert!(lines[1].contains("already exists"));
    }
}
