mod common;

use common::*;

#[test]
fn test_file_pair_is_copied_and_rendered() {
    let env = TestEnv::new();
    env.write("test.tmpl", SIMPLE_TEMPLATE);

    let result = env.run(&["-f", "test.tmpl,out/canary.conf"]);

    assert!(result.success, "stderr:\n{}", result.stderr);
    assert_eq!(env.read("out/canary.conf"), SIMPLE_RENDERED);
    assert_eq!(env.read("test.tmpl"), SIMPLE_TEMPLATE);
}

#[test]
fn test_single_path_renders_in_place() {
    let env = TestEnv::new();
    env.write("app.conf", SIMPLE_TEMPLATE);

    let result = env.run(&["--file", "app.conf"]);

    assert!(result.success, "stderr:\n{}", result.stderr);
    assert_eq!(env.read("app.conf"), SIMPLE_RENDERED);
}

#[test]
fn test_glob_renders_every_match_in_place() {
    let env = TestEnv::new();
    env.write("conf/a.tmpl", SIMPLE_TEMPLATE);
    env.write("conf/nested/b.tmpl", SIMPLE_TEMPLATE);
    env.write("conf/keep.txt", SIMPLE_TEMPLATE);

    let result = env.run(&["-g", "conf/**/*.tmpl"]);

    assert!(result.success, "stderr:\n{}", result.stderr);
    assert_eq!(env.read("conf/a.tmpl"), SIMPLE_RENDERED);
    assert_eq!(env.read("conf/nested/b.tmpl"), SIMPLE_RENDERED);
    assert_eq!(env.read("conf/keep.txt"), SIMPLE_TEMPLATE);
}

#[test]
fn test_literal_file_is_unchanged() {
    let env = TestEnv::new();
    env.write("plain.conf", LITERAL_TEMPLATE);

    let result = env.run(&["-f", "plain.conf"]);

    assert!(result.success, "stderr:\n{}", result.stderr);
    assert_eq!(env.read("plain.conf"), LITERAL_TEMPLATE);
}

#[test]
fn test_dir_then_glob_into_copied_directory() {
    let env = TestEnv::new();
    env.write("source/dir/test.tmpl", SIMPLE_TEMPLATE);

    let result = env.run(&["-d", "source, copied", "-g", "copied/**/*.tmpl"]);

    // Explicit globs expand before explicit dirs are fetched
    assert!(result.success, "stderr:\n{}", result.stderr);
    assert_eq!(env.read("copied/dir/test.tmpl"), SIMPLE_TEMPLATE);
}

#[test]
fn test_archive_dir_is_extracted_then_rendered() {
    let env = TestEnv::new();
    env.write_tar_gz(
        "bundle.tgz",
        &[("conf/app.tmpl", SIMPLE_TEMPLATE), ("README", "docs")],
    );

    let result = env.run(&["-d", "bundle.tgz, app", "-g", "app/**/*.tmpl"]);

    assert!(result.success, "stderr:\n{}", result.stderr);
    assert_eq!(env.read("app/README"), "docs");
    assert_eq!(env.read("app/conf/app.tmpl"), SIMPLE_RENDERED);
}

#[cfg(unix)]
#[test]
fn test_symlinked_destination_renders_its_target() {
    let env = TestEnv::new();
    env.write("real/app.conf", SIMPLE_TEMPLATE);
    std::os::unix::fs::symlink("real/app.conf", env.path("app.conf")).unwrap();

    let result = env.run(&["-f", "app.conf"]);

    assert!(result.success, "stderr:\n{}", result.stderr);
    let link = std::fs::symlink_metadata(env.path("app.conf")).unwrap();
    assert!(link.file_type().is_symlink());
    assert_eq!(env.read("real/app.conf"), SIMPLE_RENDERED);
}

#[test]
fn test_declaration_arguments_are_templated() {
    let env = TestEnv::new();
    env.write("test.tmpl", SIMPLE_TEMPLATE);

    let result = env.run_with_env(
        &["-f", r#"test.tmpl, {{ get_env(name="OUT_DIR") }}/rendered"#],
        &[("OUT_DIR", "from-env")],
    );

    assert!(result.success, "stderr:\n{}", result.stderr);
    assert_eq!(env.read("from-env/rendered"), SIMPLE_RENDERED);
}

#[test]
fn test_quiet_suppresses_progress_lines() {
    let env = TestEnv::new();
    env.write("a.tmpl", SIMPLE_TEMPLATE);

    let loud = env.run(&["-f", "a.tmpl"]);
    env.write("a.tmpl", SIMPLE_TEMPLATE);
    let quiet = env.run(&["--quiet", "-f", "a.tmpl"]);

    assert!(loud.success && quiet.success);
    assert!(loud.stderr.contains("rendering template file a.tmpl"), "{}", loud.stderr);
    assert!(quiet.stderr.trim().is_empty(), "{}", quiet.stderr);
}

#[cfg(unix)]
#[test]
fn test_secret_lookup_through_aws_cli() {
    let env = TestEnv::new();
    let aws = env.fake_aws(FAKE_AWS_SSM);
    env.write(
        "creds.conf",
        r#"user={{ secret_value(key="/app/user", decrypt=true) }}
again={{ ssm(key="/app/user", decrypt=true) }}
"#,
    );

    let result = env.run_with_env(
        &["-f", "creds.conf"],
        &[
            ("ECS_TEMPLATE_AWS_BIN", aws.to_str().unwrap()),
            ("AWS_REGION", "us-east-1"),
        ],
    );

    assert!(result.success, "stderr:\n{}", result.stderr);
    assert_eq!(env.read("creds.conf"), "user=admin\nagain=admin\n");

    let calls = env.aws_calls();
    assert_eq!(calls.len(), 1, "lookups should be memoized: {calls:?}");
    assert!(calls[0].contains("--region us-east-1"), "{}", calls[0]);
    assert!(calls[0].contains("--with-decryption"), "{}", calls[0]);
}

#[test]
fn test_template_without_secrets_needs_no_aws_cli() {
    let env = TestEnv::new();
    env.write("a.tmpl", SIMPLE_TEMPLATE);

    let result = env.run_with_env(
        &["-f", "a.tmpl"],
        &[("ECS_TEMPLATE_AWS_BIN", "/nonexistent/aws")],
    );

    assert!(result.success, "stderr:\n{}", result.stderr);
    assert_eq!(env.read("a.tmpl"), SIMPLE_RENDERED);
}
