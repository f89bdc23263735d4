//! Terminal progress rendering for pipeline events.

use denpush_deploy::{PipelineEvent, Stage};
use denpush_transfer::{ProgressSnapshot, format_bytes};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

const BAR_TEMPLATE: &str = "{prefix:>14.cyan.bold} [{bar:20.green}] {percent:>3}% {msg}";
const SPINNER_TEMPLATE: &str = "{prefix:>14.cyan.bold} {spinner} {msg}";
const BAR_CHARS: &str = "■■ ";

/// `"<done> of <total> at <speed> Mbps"`.
pub fn progress_message(snapshot: &ProgressSnapshot) -> String {
    format!(
        "{} of {} at {:.2} Mbps",
        format_bytes(snapshot.bytes_transferred),
        format_bytes(snapshot.total_bytes),
        snapshot.megabits_per_second
    )
}

/// Draws pipeline events until the channel closes.
pub fn spawn(mut events: UnboundedReceiver<PipelineEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut renderer = Renderer::new(ProgressDrawTarget::stderr);
        while let Some(event) = events.recv().await {
            renderer.handle(event);
        }
        renderer.finish();
    })
}

/// One bar per stage; a new stage finishes the previous bar.
struct Renderer {
    target: fn() -> ProgressDrawTarget,
    current: Option<(Stage, ProgressBar)>,
}

impl Renderer {
    fn new(target: fn() -> ProgressDrawTarget) -> Self {
        Self {
            target,
            current: None,
        }
    }

    fn handle(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Stage(stage) => {
                self.finish();
                self.current = Some((stage, self.new_bar(stage)));
            }
            PipelineEvent::Progress { stage, snapshot } => match &self.current {
                Some((current, bar)) if *current == stage => {
                    bar.set_length(snapshot.total_bytes);
                    bar.set_position(snapshot.bytes_transferred);
                    bar.set_message(progress_message(&snapshot));
                }
                _ => {}
            },
            PipelineEvent::Finished { .. } => self.finish(),
        }
    }

    fn new_bar(&self, stage: Stage) -> ProgressBar {
        let bar = if stage == Stage::Authenticating {
            let bar = ProgressBar::with_draw_target(None, (self.target)());
            bar.set_style(style(SPINNER_TEMPLATE));
            bar.set_message("requesting token");
            bar
        } else {
            let bar = ProgressBar::with_draw_target(Some(0), (self.target)());
            bar.set_style(style(BAR_TEMPLATE).progress_chars(BAR_CHARS));
            bar
        };
        bar.set_prefix(stage.to_string());
        bar
    }

    fn finish(&mut self) {
        if let Some((_, bar)) = self.current.take() {
            bar.finish();
        }
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn hidden() -> Renderer {
        Renderer::new(ProgressDrawTarget::hidden)
    }

    fn snapshot(done: u64, total: u64) -> ProgressSnapshot {
        ProgressSnapshot::new(done, total, Duration::from_secs(1))
    }

    #[test]
    fn message_format() {
        let msg = progress_message(&snapshot(1024 * 1024, 3 * 1024 * 1024 + 512 * 1024));
        assert_eq!(msg, "1 MB of 3 MB 512 KB at 8.00 Mbps");
    }

    #[test]
    fn progress_moves_current_bar() {
        let mut renderer = hidden();
        renderer.handle(PipelineEvent::Stage(Stage::Compressing));
        renderer.handle(PipelineEvent::Progress {
            stage: Stage::Compressing,
            snapshot: snapshot(40, 100),
        });

        let (stage, bar) = renderer.current.as_ref().unwrap();
        assert_eq!(*stage, Stage::Compressing);
        assert_eq!(bar.length(), Some(100));
        assert_eq!(bar.position(), 40);
    }

    #[test]
    fn stale_stage_progress_is_ignored() {
        let mut renderer = hidden();
        renderer.handle(PipelineEvent::Stage(Stage::Uploading));
        renderer.handle(PipelineEvent::Progress {
            stage: Stage::Archiving,
            snapshot: snapshot(5, 10),
        });

        let (_, bar) = renderer.current.as_ref().unwrap();
        assert_eq!(bar.position(), 0);
    }

    #[test]
    fn finished_closes_bar() {
        let mut renderer = hidden();
        renderer.handle(PipelineEvent::Stage(Stage::Archiving));
        let bar = renderer.current.as_ref().unwrap().1.clone();

        renderer.handle(PipelineEvent::Finished {
            path: "x.tar".into(),
        });
        assert!(renderer.current.is_none());
        assert!(bar.is_finished());
    }
}
