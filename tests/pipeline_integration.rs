//! End-to-end pipeline tests over in-memory programs and files

use c2c::config::{ContentBlob, EnvOverrides, ProjectConfig};
use c2c::diagnostics::{DiagnosticCode, Severity};
use c2c::fs::MockFileSystem;
use c2c::model::{
    Arg, BuildMode, Expr, Field, ModuleModel, ProgramModel, ServiceDecl, TaskDecl, VariableDecl,
};
use c2c::pipeline::PipelineOrchestrator;
use c2c::session::{BuildOutput, BuildSession, SessionRegistry};
use c2c::validation::Validator;
use std::path::Path;
use std::sync::Arc;

fn http(port: Expr) -> Expr {
    Expr::new_listener(Some("http:Listener"), vec![Arg::positional(port)])
}

fn store(path: &str) -> Expr {
    Expr::record(vec![Field::new("path", Expr::string(path))])
}

fn hello_world() -> ProgramModel {
    ProgramModel::new("hello").with_module(
        ModuleModel::new("main").with_service(
            ServiceDecl::new(&["/", "helloWorld"])
                .with_listener(http(Expr::int(9090)))
                .with_resource("GET", &["data"])
                .with_resource("GET", &["sayHello"]),
        ),
    )
}

fn run(
    program: ProgramModel,
    mode: BuildMode,
    project: Option<&str>,
    fs: MockFileSystem,
) -> BuildOutput {
    let mut session = BuildSession::new(program, mode)
        .with_env(EnvOverrides::new())
        .with_project_dir("/mock");
    if let Some(document) = project {
        let project = ProjectConfig::parse(document, Path::new("Cloud.toml")).unwrap();
        session = session.with_project(project);
    }
    PipelineOrchestrator::new(Arc::new(fs), Arc::new(Validator::new()))
        .run(&mut SessionRegistry::new(), session)
        .unwrap()
}

#[test]
fn test_single_literal_listener() {
    let output = run(hello_world(), BuildMode::Standard, None, MockFileSystem::new());

    assert!(output.diagnostics.is_empty());
    let workload = output.graph.workload().unwrap();
    assert_eq!(workload.ports.len(), 1);
    assert_eq!(workload.ports[0].container_port, 9090);

    assert_eq!(output.graph.endpoints.len(), 1);
    let endpoint = &output.graph.endpoints[0];
    assert_eq!(endpoint.port, 9090);
    assert_eq!(endpoint.service_paths, vec!["/helloWorld"]);
    assert_eq!(output.build.ports, vec![9090]);
}

#[test]
fn test_key_and_trust_store_share_one_secret() {
    let secure = Expr::new_listener(
        Some("http:Listener"),
        vec![
            Arg::positional(Expr::int(9443)),
            Arg::named(
                "secureSocket",
                Expr::record(vec![
                    Field::new("key", store("./resources/keystore.p12")),
                    Field::new("cert", store("./resources/truststore.p12")),
                ]),
            ),
        ],
    );
    let program = ProgramModel::new("hello").with_module(
        ModuleModel::new("main")
            .with_service(ServiceDecl::new(&["/", "hello"]).with_listener(secure)),
    );
    let fs = MockFileSystem::new();
    fs.add_file("resources/keystore.p12", "key material");
    fs.add_file("resources/truststore.p12", "trust material");

    let output = run(program, BuildMode::Standard, None, fs);

    assert!(!output.has_errors());
    assert_eq!(output.graph.secrets.len(), 1);
    let secret = output.graph.secret_at("/home/app/resources").unwrap();
    let keys: Vec<_> = secret.data.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["keystore.p12", "truststore.p12"]);
    assert_eq!(
        secret.data["truststore.p12"],
        ContentBlob::Text("trust material".to_string())
    );

    let mounts = &output.graph.workload().unwrap().volume_mounts;
    assert_eq!(mounts.len(), 1);
    assert_eq!(mounts[0].mount_path, "/home/app/resources");
    assert!(mounts[0].read_only);
}

#[test]
fn test_unreadable_secure_socket_file() {
    let secure = Expr::new_listener(
        Some("http:Listener"),
        vec![
            Arg::positional(Expr::int(9443)),
            Arg::named(
                "secureSocket",
                Expr::record(vec![Field::new("key", store("./resources/keystore.p12"))]),
            ),
        ],
    );
    let program = ProgramModel::new("hello").with_module(
        ModuleModel::new("main")
            .with_service(ServiceDecl::new(&["/", "hello"]).with_listener(secure)),
    );

    let output = run(program, BuildMode::Standard, None, MockFileSystem::new());

    assert!(output.graph.secrets.is_empty());
    assert_eq!(
        output
            .diagnostics
            .with_code(DiagnosticCode::UnreadableSecureSocketFile)
            .count(),
        1
    );
}

#[test]
fn test_pipeline_is_idempotent() {
    let project = r#"
[deployment]
replicas = 2

[config.files.app]
file = "app.properties"
mount_path = "/home/app/conf-extra"
"#;
    let build = || {
        let fs = MockFileSystem::new();
        fs.add_file("app.properties", "greeting=hello");
        run(hello_world(), BuildMode::Standard, Some(project), fs)
    };

    let first = serde_json::to_string(&build()).unwrap();
    let second = serde_json::to_string(&build()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_single_service_mode_ignores_later_services() {
    let module = ModuleModel::new("main")
        .with_service(ServiceDecl::new(&["/", "first"]).with_listener(http(Expr::int(9090))))
        .with_service(ServiceDecl::new(&["/", "second"]).with_listener(http(Expr::int(9091))))
        .with_service(ServiceDecl::new(&["/", "third"]).with_listener(http(Expr::int(9092))));
    let program = ProgramModel::new("app").with_module(module);

    let output = run(program, BuildMode::SingleService, None, MockFileSystem::new());

    let warnings: Vec<_> = output
        .diagnostics
        .with_code(DiagnosticCode::ServiceLimitExceeded)
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|d| d.severity == Severity::Warning));
    assert!(!output.has_errors());

    assert_eq!(output.graph.endpoints.len(), 1);
    assert_eq!(output.graph.endpoints[0].service_paths, vec!["/first"]);
    assert_eq!(output.build.ports, vec![9090]);
}

#[test]
fn test_probe_on_existing_resource() {
    let project = r#"
[deployment.probes.readiness]
port = 9090
path = "/helloWorld/data"
"#;
    let output = run(hello_world(), BuildMode::Standard, Some(project), MockFileSystem::new());

    assert!(output.diagnostics.is_empty());
    let readiness = output.graph.workload().unwrap().readiness.as_ref().unwrap();
    assert_eq!(readiness.port, 9090);
    assert_eq!(readiness.path, "/helloWorld/data");
}

#[test]
fn test_probe_on_missing_resource() {
    let project = r#"
[deployment.probes.readiness]
port = 9090
path = "/helloWorld/missing"
"#;
    let output = run(hello_world(), BuildMode::Standard, Some(project), MockFileSystem::new());

    let errors: Vec<_> = output.diagnostics.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, DiagnosticCode::InvalidProbeResourcePath);
    assert!(errors[0].message.contains("/helloWorld/missing"));
}

#[test]
fn test_probe_on_unknown_port() {
    let project = r#"
[deployment.probes.liveness]
port = 8080
path = "/helloWorld/data"
"#;
    let output = run(hello_world(), BuildMode::Standard, Some(project), MockFileSystem::new());

    assert!(output
        .diagnostics
        .with_code(DiagnosticCode::InvalidProbePort)
        .next()
        .is_some());
}

#[test]
fn test_configurable_port_with_default() {
    let program = ProgramModel::new("hello").with_module(
        ModuleModel::new("main")
            .with_variable(VariableDecl::configurable("port", Some(Expr::int(9090))))
            .with_service(
                ServiceDecl::new(&["/", "hello"]).with_listener(http(Expr::reference("port"))),
            ),
    );

    let output = run(program, BuildMode::Standard, None, MockFileSystem::new());

    assert_eq!(output.diagnostics.len(), 1);
    let warning = output.diagnostics.iter().next().unwrap();
    assert_eq!(warning.code, DiagnosticCode::ConfigurablePortDefault);
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(output.graph.workload().unwrap().ports[0].container_port, 9090);
}

#[test]
fn test_configurable_port_without_default() {
    let program = ProgramModel::new("hello").with_module(
        ModuleModel::new("main")
            .with_variable(VariableDecl::configurable("port", None))
            .with_service(
                ServiceDecl::new(&["/", "hello"]).with_listener(http(Expr::reference("port"))),
            ),
    );

    let output = run(program, BuildMode::Standard, None, MockFileSystem::new());

    assert_eq!(output.diagnostics.errors().count(), 1);
    assert_eq!(
        output.diagnostics.errors().next().unwrap().code,
        DiagnosticCode::ConfigurablePortNoDefault
    );
    assert!(output.graph.workload().unwrap().ports.is_empty());
    assert!(output.graph.endpoints.is_empty());
}

#[test]
fn test_scheduled_program_becomes_job() {
    let program = ProgramModel::new("cleanup").with_module(ModuleModel::new("main").with_task(
        TaskDecl {
            name: "purge".to_string(),
            minutes: Some("*/5".to_string()),
            ..Default::default()
        },
    ));

    let output = run(program, BuildMode::Standard, None, MockFileSystem::new());

    let job = output.graph.job().unwrap();
    assert_eq!(job.name, "cleanup-job");
    assert_eq!(job.schedule.as_deref(), Some("*/5 * * * *"));
    assert!(output.graph.endpoints.is_empty());
    assert!(output.graph.autoscaler.is_none());
}

#[test]
fn test_same_file_name_twice_in_one_mount() {
    let project = r#"
[config.files.first]
file = "a/app.properties"
mount_path = "/home/app/conf-extra"

[config.files.second]
file = "b/app.properties"
mount_path = "/home/app/conf-extra/"
"#;
    let fs = MockFileSystem::new();
    fs.add_file("a/app.properties", "a=1");
    fs.add_file("b/app.properties", "b=2");

    let output = run(hello_world(), BuildMode::Standard, Some(project), fs);

    assert_eq!(
        output.diagnostics.with_code(DiagnosticCode::DuplicateMountKey).count(),
        1
    );
    let config_map = output.graph.config_map_at("/home/app/conf-extra").unwrap();
    assert_eq!(config_map.name, "first-config-map");
    assert_eq!(
        config_map.data["app.properties"],
        ContentBlob::Text("a=1".to_string())
    );
}

#[test]
fn test_reserved_mount_path_is_rejected() {
    let project = r#"
[secret.files.db]
file = "db.pass"
mount_path = "/home/app/conf/"
"#;
    let fs = MockFileSystem::new();
    fs.add_file("db.pass", "secret");

    let output = run(hello_world(), BuildMode::Standard, Some(project), fs);

    assert_eq!(
        output.diagnostics.with_code(DiagnosticCode::ReservedMountPath).count(),
        1
    );
    assert!(output.graph.secrets.is_empty());
}

#[test]
fn test_secure_socket_files_under_config_dir() {
    let secure = Expr::new_listener(
        Some("http:Listener"),
        vec![
            Arg::positional(Expr::int(9443)),
            Arg::named(
                "secureSocket",
                Expr::record(vec![Field::new(
                    "key",
                    Expr::record(vec![
                        Field::new("certFile", Expr::string("./conf/public.crt")),
                        Field::new("keyFile", Expr::string("./conf/private.key")),
                    ]),
                )]),
            ),
        ],
    );
    let program = ProgramModel::new("hello").with_module(
        ModuleModel::new("main")
            .with_service(ServiceDecl::new(&["/", "secure"]).with_listener(secure)),
    );
    let fs = MockFileSystem::new();
    fs.add_file("conf/public.crt", "cert");
    fs.add_file("conf/private.key", "key");

    let output = run(program, BuildMode::Standard, None, fs);

    assert_eq!(
        output.diagnostics.with_code(DiagnosticCode::ReservedMountPath).count(),
        2
    );
    assert!(output.has_errors());
    assert!(output.graph.secrets.is_empty());
    assert!(output.graph.workload().unwrap().volume_mounts.is_empty());
}
