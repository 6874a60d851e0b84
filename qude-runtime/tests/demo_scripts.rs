//! scripts/ 下的示例脚本必须能解析且静态检查干净

use qude_runtime::{
    DispatchOutcome, MemoryHost, MouseButton, Parser, QudeRuntime, analyze_program,
};

const LOGIN: &str = include_str!("../../scripts/login.q");
const COUNTER: &str = include_str!("../../scripts/counter.q");

#[test]
fn test_demo_scripts_are_clean() {
    for (id, text) in [("login.q", LOGIN), ("counter.q", COUNTER)] {
        let program = Parser::new().parse(id, text).unwrap();
        let result = analyze_program(&program);
        assert!(result.is_empty(), "{id}: {:?}", result.diagnostics);
    }
}

#[test]
fn test_login_flow() {
    let program = Parser::new().parse("login.q", LOGIN).unwrap();
    let mut runtime = QudeRuntime::new(program);
    let mut host = MemoryHost::new();
    let summary = runtime.run(&mut host).unwrap();
    assert_eq!(summary.failed, 0);
    assert_eq!(host.open_surfaces().len(), 1);

    let ok = runtime.warn_option("ok").unwrap();
    for input in host.click(ok, MouseButton::Left) {
        assert_eq!(runtime.dispatch(input, &mut host), DispatchOutcome::Executed);
    }
    assert!(host.open_surfaces().is_empty());

    let pw = runtime.widget("pw").unwrap();
    for input in host.type_text(pw, "open sesame") {
        runtime.dispatch(input, &mut host);
    }
    let go = runtime.widget("go").unwrap();
    for input in host.click(go, MouseButton::Left) {
        runtime.dispatch(input, &mut host);
    }
    assert_eq!(host.console_lines(), vec!["welcome back", "checking..."]);
}

#[test]
fn test_counter_without_answer() {
    let program = Parser::new().parse("counter.q", COUNTER).unwrap();
    let mut runtime = QudeRuntime::new(program);
    let mut host = MemoryHost::new().with_answers(["no"]);
    runtime.run(&mut host).unwrap();
    assert_eq!(host.console_lines(), vec!["idle", "1"]);
}
