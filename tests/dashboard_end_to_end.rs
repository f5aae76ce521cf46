// tests/dashboard_end_to_end.rs
#![cfg(unix)]

use std::error::Error;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use tokio::sync::mpsc;

use devboard::config::ConfigFile;
use devboard::engine::SessionOutcome;
use devboard::exec::{group_prerequisites, run_prerequisite_batches};
use devboard::tui::UiEvent;
use devboard::types::{StatusValue, TaskId};
use devboard_test_utils::builders::{ProjectBuilder, WorkspaceBuilder};
use devboard_test_utils::script_launcher::ScriptLauncher;
use devboard_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// lib:watch and app:serve, both needing `build` on [app, lib] first.
fn workspace() -> ConfigFile {
    WorkspaceBuilder::new()
        .with_project(
            "lib",
            ProjectBuilder::new()
                .task("build", &[])
                .task("watch", &["build"])
                .build(),
        )
        .with_project(
            "app",
            ProjectBuilder::new()
                .depends_on("lib")
                .task("build", &[])
                .task("serve", &["^build"])
                .build(),
        )
        .select("app:serve")
        .select_with_matchers(
            "lib:watch",
            &[
                ("compiled successfully", StatusValue::Success),
                ("ERROR", StatusValue::Error),
            ],
        )
        .with_tick_ms(20)
        .build()
}

fn screen(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn row_line(screen: &str, label: &str) -> String {
    screen
        .lines()
        .find(|l| l.starts_with('│') && l.contains(label))
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn batch_then_watch_tasks_with_live_status() -> TestResult {
    init_tracing();
    let cfg = workspace();
    let root = tempfile::tempdir()?;
    let plan = devboard::plan(&cfg, root.path())?;

    let launcher = ScriptLauncher::new()
        .script("build", "exit 0")
        .script("app:serve", "printf 'app booting\\n'; sleep 1; printf 'app up\\n'")
        .script(
            "lib:watch",
            "printf '\\033[32mcompiled successfully\\033[0m\\n'; sleep 1",
        );

    let groups = group_prerequisites(&plan.prerequisites);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["build"], vec!["app", "lib"]);
    run_prerequisite_batches(&groups, &plan.runner, &launcher).await?;

    let (input_tx, input_rx) = mpsc::channel::<UiEvent>(8);
    let terminal = Terminal::new(TestBackend::new(80, 12))?;
    let mut session = devboard::start_session(
        plan.watch,
        &plan.runner,
        &cfg,
        launcher.clone(),
        terminal,
        input_rx,
    );

    let outcome = with_timeout(session.run()).await?;
    assert_eq!(outcome, SessionOutcome::AllExited);
    drop(input_tx);

    // Rows are in graph order: app:serve first, lib:watch second.
    let core = session.core();
    let app = core.arena().get(TaskId(0)).unwrap();
    let lib = core.arena().get(TaskId(1)).unwrap();
    assert_eq!(app.display_name, "app:serve");
    assert_eq!(lib.display_name, "lib:watch");
    assert_eq!(app.log.raw(), "app booting\napp up\n");
    assert!(lib.log.plain().contains("compiled successfully"));

    // Every exit is an error once the session is over.
    assert_eq!(app.status, StatusValue::Error);
    assert_eq!(lib.status, StatusValue::Error);

    // app:serve is selected by default and its pane never saw lib output.
    assert_eq!(core.dashboard().selected(), Some(TaskId(0)));
    assert_eq!(core.dashboard().pane().content(), "app booting\napp up\n");

    let launched: Vec<String> = launcher.launched().iter().map(|c| c.to_string()).collect();
    assert!(launched[0].starts_with("nx run-many -t build -p app,lib"), "{launched:?}");
    assert!(launched[1].starts_with("nx run app:serve"), "{launched:?}");
    assert!(launched[2].starts_with("nx run lib:watch"), "{launched:?}");
    Ok(())
}

#[tokio::test]
async fn success_glyph_for_matched_task_while_other_keeps_spinning() -> TestResult {
    init_tracing();
    let cfg = workspace();
    let plan = devboard::plan(&cfg, std::env::temp_dir().as_path())?;

    let launcher = ScriptLauncher::new()
        .script("app:serve", "trap '' INT; sleep 2")
        .script("lib:watch", "trap '' INT; printf 'compiled successfully\\n'; sleep 2");

    let (input_tx, input_rx) = mpsc::channel::<UiEvent>(8);
    let terminal = Terminal::new(TestBackend::new(80, 12))?;
    let mut session =
        devboard::start_session(plan.watch, &plan.runner, &cfg, launcher, terminal, input_rx);

    // Interrupt twice quickly once lib:watch has reported. The scripts ignore
    // SIGINT, so only the second interrupt can end the session.
    let driver = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let at = std::time::Instant::now();
        input_tx.send(UiEvent::Interrupt { at }).await.ok();
        input_tx
            .send(UiEvent::Interrupt {
                at: at + Duration::from_millis(10),
            })
            .await
            .ok();
    };
    let (outcome, ()) = with_timeout(async { tokio::join!(session.run(), driver) }).await;
    assert_eq!(outcome?, SessionOutcome::ForcedExit);

    let text = screen(session.terminal());
    let lib_row = row_line(&text, "lib:watch");
    let app_row = row_line(&text, "app:serve");
    assert!(lib_row.contains("✓ lib:watch"), "{text}");
    assert!(!app_row.contains("✓") && !app_row.contains("✗"), "{text}");
    assert_eq!(
        session.core().arena().get(TaskId(1)).unwrap().status,
        StatusValue::Success
    );
    Ok(())
}

#[tokio::test]
async fn switching_rows_shows_only_the_selected_task_log() -> TestResult {
    init_tracing();
    let cfg = workspace();
    let plan = devboard::plan(&cfg, std::env::temp_dir().as_path())?;

    let launcher = ScriptLauncher::new()
        .script(
            "app:serve",
            "printf 'app one\\n'; sleep 1; printf 'app two\\n'; sleep 0.5",
        )
        .script(
            "lib:watch",
            "printf 'lib chatter\\n'; sleep 0.5; printf 'lib more\\n'; sleep 0.5",
        );

    let (input_tx, input_rx) = mpsc::channel::<UiEvent>(8);
    let terminal = Terminal::new(TestBackend::new(80, 12))?;
    let mut session =
        devboard::start_session(plan.watch, &plan.runner, &cfg, launcher, terminal, input_rx);

    // Move to lib:watch and back to app:serve while both are still running.
    let driver = async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        input_tx.send(UiEvent::Down).await.ok();
        tokio::time::sleep(Duration::from_millis(300)).await;
        input_tx.send(UiEvent::Up).await.ok();
    };
    let (outcome, ()) = with_timeout(async { tokio::join!(session.run(), driver) }).await;
    assert_eq!(outcome?, SessionOutcome::AllExited);

    let core = session.core();
    let app = core.arena().get(TaskId(0)).unwrap();
    assert_eq!(app.log.raw(), "app one\napp two\n");
    assert_eq!(core.dashboard().selected(), Some(TaskId(0)));
    assert_eq!(core.dashboard().pane().content(), app.log.raw());

    let text = screen(session.terminal());
    assert!(text.contains("app two"), "{text}");
    assert!(!text.contains("lib chatter") && !text.contains("lib more"), "{text}");
    Ok(())
}
