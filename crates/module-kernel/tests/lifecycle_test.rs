use module_kernel::mock::{Hook, HookEvent, HookLog, RecordingModule};
use module_kernel::tracing::setup_tracing;
use module_kernel::{Kernel, KernelConfig, KernelError, Status};
use std::time::Duration;

const NO_DEPS: [&str; 0] = [];
const WAIT: Duration = Duration::from_secs(5);

fn kernel() -> Kernel {
    setup_tracing();
    Kernel::with_config(
        KernelConfig::default()
            .with_name("test")
            .with_pass_interval(Duration::from_millis(1)),
    )
}

fn position(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|n| n == name)
        .unwrap_or_else(|| panic!("{name} missing from {order:?}"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_lifecycle_runs_in_dependency_order() {
    let log = HookLog::new();
    let mut kernel = kernel();

    kernel.add(RecordingModule::new("b", &log), ["a"]).unwrap();
    kernel.add(RecordingModule::new("c", &log), ["a"]).unwrap();
    kernel.add(RecordingModule::new("a", &log), NO_DEPS).unwrap();

    kernel.start().await.unwrap();
    assert_eq!(kernel.status(), Status::Running);

    let inits = log.modules_for(Hook::Init);
    assert_eq!(inits.len(), 3);
    assert!(position(&inits, "a") < position(&inits, "b"));
    assert!(position(&inits, "a") < position(&inits, "c"));
    for name in ["a", "b", "c"] {
        assert_eq!(log.count(name, Hook::Init), 1);
    }

    assert!(log.wait_for("c", Hook::Tick, 3, WAIT).await);

    kernel.shutdown().await.unwrap();
    assert_eq!(kernel.status(), Status::Idle);

    let mut halts = log.modules_for(Hook::Halt);
    halts.reverse();
    assert_eq!(halts, inits);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_every_init_precedes_first_tick_and_halt_is_last() {
    let log = HookLog::new();
    let mut kernel = kernel();
    kernel.add(RecordingModule::new("base", &log), NO_DEPS).unwrap();
    kernel.add(RecordingModule::new("mid", &log), ["base"]).unwrap();
    kernel.add(RecordingModule::new("top", &log), ["mid", "base"]).unwrap();

    kernel.start().await.unwrap();
    assert!(log.wait_for("top", Hook::Tick, 2, WAIT).await);
    kernel.shutdown().await.unwrap();

    let events = log.events();
    let last_init = events.iter().rposition(|e| e.hook == Hook::Init).unwrap();
    let first_tick = events.iter().position(|e| e.hook == Hook::Tick).unwrap();
    let last_tick = events.iter().rposition(|e| e.hook == Hook::Tick).unwrap();
    let first_halt = events.iter().position(|e| e.hook == Hook::Halt).unwrap();
    assert!(last_init < first_tick);
    assert!(last_tick < first_halt);

    // Every tick pass visits modules in init order.
    let ticks: Vec<&HookEvent> = events.iter().filter(|e| e.hook == Hook::Tick).collect();
    for pass in ticks.chunks(3) {
        let names: Vec<&str> = pass.iter().map(|e| e.module.as_str()).collect();
        assert_eq!(names, vec!["base", "mid", "top"]);
    }
}

#[tokio::test]
async fn test_cycle_rejected_without_running_hooks() {
    let log = HookLog::new();
    let mut kernel = kernel();
    kernel.add(RecordingModule::new("a", &log), ["b"]).unwrap();
    kernel.add(RecordingModule::new("b", &log), ["a"]).unwrap();

    let err = kernel.start().await.unwrap_err();
    assert_eq!(
        err,
        KernelError::CyclicDependency {
            modules: vec!["a".into(), "b".into()]
        }
    );
    assert_eq!(kernel.status(), Status::Idle);
    assert!(log.is_empty());

    // Fully recoverable: replace the offending module and retry.
    kernel.remove("a").unwrap();
    kernel.add(RecordingModule::new("a", &log), NO_DEPS).unwrap();
    kernel.start().await.unwrap();
    kernel.shutdown().await.unwrap();
    assert_eq!(log.modules_for(Hook::Init), vec!["a", "b"]);
}

#[tokio::test]
async fn test_unknown_dependency_then_fixed_registration() {
    let log = HookLog::new();
    let mut kernel = kernel();
    kernel.add(RecordingModule::new("m1", &log), ["m2"]).unwrap();

    let err = kernel.start().await.unwrap_err();
    assert_eq!(
        err,
        KernelError::UnknownDependency {
            module: "m1".into(),
            dependency: "m2".into(),
        }
    );
    assert_eq!(err.as_label(), "dependency_unknown");
    assert_eq!(kernel.status(), Status::Idle);
    assert!(log.is_empty());

    kernel.add(RecordingModule::new("m2", &log), NO_DEPS).unwrap();
    kernel.start().await.unwrap();
    assert_eq!(log.modules_for(Hook::Init), vec!["m2", "m1"]);
    kernel.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_name_keeps_original_registration() {
    let log = HookLog::new();
    let mut kernel = kernel();
    kernel.add(RecordingModule::new("a", &log), NO_DEPS).unwrap();
    kernel.add(RecordingModule::new("b", &log), NO_DEPS).unwrap();

    let err = kernel
        .add(RecordingModule::new("a", &log), ["b"])
        .unwrap_err();
    assert_eq!(err, KernelError::DuplicateModule("a".into()));
    assert_eq!(kernel.len(), 2);

    // The original "a" has no dependency on "b", so it still sorts first.
    assert_eq!(kernel.schedule().unwrap(), vec!["a", "b"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mutation_refused_while_running() {
    let log = HookLog::new();
    let mut kernel = kernel();
    kernel.add(RecordingModule::new("a", &log), NO_DEPS).unwrap();
    kernel.start().await.unwrap();

    assert_eq!(
        kernel.add(RecordingModule::new("b", &log), NO_DEPS),
        Err(KernelError::NotIdle(Status::Running))
    );
    assert!(matches!(
        kernel.remove("a"),
        Err(KernelError::NotIdle(Status::Running))
    ));
    assert_eq!(kernel.names(), vec!["a"]);

    // Lookups stay available while running.
    let handle = kernel.find("a").expect("a is registered");
    assert_eq!(handle.lock().await.name(), "a");
    assert!(kernel.find("b").is_none());

    kernel.shutdown().await.unwrap();
    assert!(kernel.remove("a").is_ok());
    assert!(kernel.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_start_is_refused() {
    let log = HookLog::new();
    let mut kernel = kernel();
    kernel.add(RecordingModule::new("a", &log), NO_DEPS).unwrap();

    kernel.start().await.unwrap();
    assert_eq!(
        kernel.start().await,
        Err(KernelError::NotIdle(Status::Running))
    );
    kernel.shutdown().await.unwrap();

    assert_eq!(log.count("a", Hook::Init), 1);
    assert_eq!(log.count("a", Hook::Halt), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_module_requested_stop_ends_after_full_pass() {
    let log = HookLog::new();
    let mut kernel = kernel();
    kernel.add(RecordingModule::new("first", &log), NO_DEPS).unwrap();
    kernel
        .add(RecordingModule::new("second", &log).stop_after(4), ["first"])
        .unwrap();
    kernel.add(RecordingModule::new("third", &log), ["second"]).unwrap();

    kernel.start().await.unwrap();
    assert!(log.wait_for("first", Hook::Halt, 1, WAIT).await);
    kernel.shutdown().await.unwrap();

    for name in ["first", "second", "third"] {
        assert_eq!(log.count(name, Hook::Tick), 4, "ticks of {name}");
        assert_eq!(log.count(name, Hook::Halt), 1);
    }
    assert_eq!(log.modules_for(Hook::Halt), vec!["third", "second", "first"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_restart_after_stop_halts_previous_run_first() {
    let log = HookLog::new();
    let mut kernel = kernel();
    kernel.add(RecordingModule::new("a", &log), NO_DEPS).unwrap();
    kernel.add(RecordingModule::new("b", &log), ["a"]).unwrap();

    kernel.start().await.unwrap();
    kernel.stop();
    assert_eq!(kernel.status(), Status::Idle);

    kernel.start().await.unwrap();
    kernel.shutdown().await.unwrap();

    let sequence: Vec<(String, Hook)> = log
        .events()
        .into_iter()
        .filter(|e| e.hook != Hook::Tick)
        .map(|e| (e.module, e.hook))
        .collect();
    let expected = vec![
        ("a".to_string(), Hook::Init),
        ("b".to_string(), Hook::Init),
        ("b".to_string(), Hook::Halt),
        ("a".to_string(), Hook::Halt),
        ("a".to_string(), Hook::Init),
        ("b".to_string(), Hook::Init),
        ("b".to_string(), Hook::Halt),
        ("a".to_string(), Hook::Halt),
    ];
    assert_eq!(sequence, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_drop_still_halts_every_module() {
    let log = HookLog::new();
    {
        let mut kernel = kernel();
        kernel.add(RecordingModule::new("a", &log), NO_DEPS).unwrap();
        kernel.add(RecordingModule::new("b", &log), ["a"]).unwrap();
        kernel.start().await.unwrap();
    }

    assert_eq!(log.modules_for(Hook::Halt), vec!["b", "a"]);
}

#[test]
fn test_drop_halts_before_runtime_shuts_down() {
    let log = HookLog::new();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    rt.block_on(async {
        let mut kernel = kernel();
        kernel.add(RecordingModule::new("a", &log), NO_DEPS).unwrap();
        kernel.add(RecordingModule::new("b", &log), ["a"]).unwrap();
        kernel.start().await.unwrap();
        drop(kernel);
    });
    drop(rt);

    assert_eq!(log.modules_for(Hook::Halt), vec!["b", "a"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_requested_in_init_aborts_startup() {
    let log = HookLog::new();
    let mut kernel = kernel();
    kernel.add(RecordingModule::new("a", &log), NO_DEPS).unwrap();
    kernel
        .add(RecordingModule::new("stopper", &log).stop_in_init(), ["a"])
        .unwrap();
    kernel.add(RecordingModule::new("last", &log), ["stopper"]).unwrap();

    assert_eq!(kernel.start().await, Err(KernelError::StoppedDuringStartup));
    assert_eq!(kernel.status(), Status::Idle);

    kernel.shutdown().await.unwrap();
    assert_eq!(log.modules_for(Hook::Init), vec!["a", "stopper", "last"]);
    assert_eq!(log.modules_for(Hook::Halt), vec!["last", "stopper", "a"]);
    for name in ["a", "stopper", "last"] {
        assert_eq!(log.count(name, Hook::Tick), 0, "ticks of {name}");
    }

    // The aborted run leaves the kernel reusable once the module stops asking.
    kernel.remove("stopper").unwrap();
    kernel.add(RecordingModule::new("stopper", &log), ["a"]).unwrap();
    kernel.start().await.unwrap();
    assert_eq!(kernel.status(), Status::Running);
    kernel.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_grace_exceeded_by_stalled_tick() {
    let log = HookLog::new();
    let mut kernel = Kernel::with_config(
        KernelConfig::default().with_shutdown_grace(Duration::from_millis(50)),
    );
    kernel
        .add(
            RecordingModule::new("slow", &log).stall_tick(Duration::from_secs(30)),
            NO_DEPS,
        )
        .unwrap();

    kernel.start().await.unwrap();
    assert!(log.wait_for("slow", Hook::Tick, 1, WAIT).await);

    let err = kernel.shutdown().await.unwrap_err();
    assert_eq!(err, KernelError::GraceExceeded(Duration::from_millis(50)));
    assert_eq!(kernel.status(), Status::Idle);
    assert_eq!(log.count("slow", Hook::Halt), 0);
}

#[tokio::test]
async fn test_empty_kernel_starts_and_stops() {
    let mut kernel = Kernel::new();
    kernel.start().await.unwrap();
    assert_eq!(kernel.status(), Status::Running);
    kernel.shutdown().await.unwrap();
    assert_eq!(kernel.status(), Status::Idle);
}

#[tokio::test]
async fn test_remove_missing_module() {
    let mut kernel = kernel();
    assert!(matches!(
        kernel.remove("ghost"),
        Err(KernelError::NotFound(name)) if name == "ghost"
    ));
    // Shutdown without a run is a no-op.
    kernel.shutdown().await.unwrap();
}
