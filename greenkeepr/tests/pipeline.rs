mod support;

use greenkeepr::{ModuleConfig, ModuleOutcome, PullRequestMarker, UpdateError, UpdatePipeline};
use serde_json::Value;
use support::{fixture, repository, FakeChecker, FakeHost, FakeSourceControl, Harness};

fn javascript_harness(report: &str) -> Harness {
    Harness::new(
        FakeHost::default(),
        FakeSourceControl::with_files(&[("package.json", fixture("javascript/package.json"))]),
        FakeChecker::with_report(report),
    )
}

fn ruby_harness(report: &str) -> Harness {
    Harness::new(
        FakeHost::default(),
        FakeSourceControl::with_files(&[
            ("api/Gemfile", fixture("ruby/Gemfile")),
            ("api/Gemfile.lock", fixture("ruby/Gemfile.lock")),
        ]),
        FakeChecker::with_report(report),
    )
}

#[tokio::test]
async fn publishes_outdated_javascript_dependency() {
    let harness = javascript_harness(&fixture("javascript/outdated.json"));
    let repository = harness.store(repository("1"));
    let module = ModuleConfig::new(".", "javascript");

    let outcome = UpdatePipeline::new(harness.ctx.clone())
        .run(&repository, &module)
        .await
        .unwrap();

    let ModuleOutcome::Published(published) = outcome else {
        panic!("expected a pull request, got {outcome:?}");
    };
    assert_eq!(published.number, 1);
    assert_eq!(published.title, "Update your JS dependencies");
    assert_eq!(published.dependencies, ["left-pad"]);
    assert!(published.branch.starts_with("greenkeep/"));

    let created = harness.host.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].head, published.branch);
    assert_eq!(created[0].base, "master");
    let markers = PullRequestMarker::parse_all(&created[0].body);
    assert_eq!(markers.len(), 1);
    assert!(markers[0].is_for(&module));
    assert_eq!(markers[0].dependencies, ["left-pad"]);

    let commits = harness.source_control.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].message, "update js dependencies");
    let (path, content) = &commits[0].files[0];
    assert_eq!(path, "package.json");
    let manifest: Value = serde_json::from_str(content).unwrap();
    assert_eq!(manifest["dependencies"]["left-pad"], "1.3.0");
    assert_eq!(manifest["dependencies"]["react"], "16.0.0");
    assert!(content.starts_with("{\n  \"name\": \"storefront\""));

    let events = harness.source_control.events();
    let push = events.iter().position(|e| e.starts_with("push ")).unwrap();
    let restore = events.iter().position(|e| e == "restore master").unwrap();
    assert!(push < restore);
}

#[tokio::test]
async fn up_to_date_module_touches_nothing() {
    let harness = javascript_harness(r#"{"react": {"wanted": "16.0.0", "latest": "16.0.0"}}"#);
    let repository = harness.store(repository("1"));

    let outcome = UpdatePipeline::new(harness.ctx.clone())
        .run(&repository, &ModuleConfig::new(".", "javascript"))
        .await
        .unwrap();

    assert_eq!(outcome, ModuleOutcome::UpToDate);
    assert!(harness.host.created().is_empty());
    assert_eq!(harness.source_control.events(), ["sync"]);
}

#[tokio::test]
async fn empty_report_means_up_to_date() {
    let harness = Harness::new(
        FakeHost::default(),
        FakeSourceControl::with_files(&[("package.json", fixture("javascript/package.json"))]),
        FakeChecker::default(),
    );
    let repository = harness.store(repository("1"));

    let outcome = UpdatePipeline::new(harness.ctx.clone())
        .run(&repository, &ModuleConfig::new(".", "javascript"))
        .await
        .unwrap();

    assert_eq!(outcome, ModuleOutcome::UpToDate);
}

#[tokio::test]
async fn second_run_finds_the_open_pull_request() {
    let harness = javascript_harness(&fixture("javascript/outdated.json"));
    let repository = harness.store(repository("1"));
    let module = ModuleConfig::new(".", "javascript");
    let pipeline = UpdatePipeline::new(harness.ctx.clone());

    let first = pipeline.run(&repository, &module).await.unwrap();
    let second = pipeline.run(&repository, &module).await.unwrap();

    assert!(matches!(first, ModuleOutcome::Published(_)));
    assert_eq!(
        second,
        ModuleOutcome::AlreadyProposed {
            dependencies: vec!["left-pad".to_string()]
        }
    );
    assert_eq!(harness.host.created().len(), 1);
}

#[tokio::test]
async fn undeclared_dependencies_are_not_proposed() {
    let harness = javascript_harness(r#"{"lodash": {"wanted": "4.0.0", "latest": "4.17.4"}}"#);
    let repository = harness.store(repository("1"));

    let outcome = UpdatePipeline::new(harness.ctx.clone())
        .run(&repository, &ModuleConfig::new(".", "javascript"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ModuleOutcome::NothingPatched {
            dependencies: vec!["lodash".to_string()]
        }
    );
    assert!(harness.host.created().is_empty());
}

#[tokio::test]
async fn missing_manifest_fails_before_the_checker_runs() {
    let harness = Harness::new(
        FakeHost::default(),
        FakeSourceControl::default(),
        FakeChecker::with_report(&fixture("javascript/outdated.json")),
    );
    let repository = harness.store(repository("1"));

    let result = UpdatePipeline::new(harness.ctx.clone())
        .run(&repository, &ModuleConfig::new("web", "javascript"))
        .await;

    assert!(matches!(result, Err(UpdateError::ManifestMissing { file }) if file == "web/package.json"));
    assert!(harness.checker.requests().is_empty());
}

#[tokio::test]
async fn unknown_language_is_rejected() {
    let harness = javascript_harness("");
    let repository = harness.store(repository("1"));

    let result = UpdatePipeline::new(harness.ctx.clone())
        .run(&repository, &ModuleConfig::new(".", "elixir"))
        .await;

    assert!(matches!(result, Err(UpdateError::UnsupportedLanguage { language }) if language == "elixir"));
}

#[tokio::test]
async fn malformed_log_is_a_parse_error() {
    let harness = ruby_harness(&fixture("ruby/malformed.log"));
    let repository = harness.store(repository("1"));

    let result = UpdatePipeline::new(harness.ctx.clone())
        .run(&repository, &ModuleConfig::new("api", "ruby"))
        .await;

    assert!(matches!(result, Err(UpdateError::ParseError(_))));
    assert!(harness.host.created().is_empty());
}

#[tokio::test]
async fn ruby_update_commits_gemfile_and_regenerated_lockfile() {
    let harness = ruby_harness(&fixture("ruby/outdated.log"));
    harness.checker.set_lockfile("regenerated\n");
    let repository = harness.store(repository("1"));
    let module = ModuleConfig::new("api", "ruby");

    let outcome = UpdatePipeline::new(harness.ctx.clone())
        .run(&repository, &module)
        .await
        .unwrap();

    let ModuleOutcome::Published(published) = outcome else {
        panic!("expected a pull request, got {outcome:?}");
    };
    assert_eq!(published.dependencies, ["puma", "rails"]);
    assert_eq!(published.title, "Update your RB dependencies");

    let requests = harness.checker.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].entrypoint.is_none());
    assert_eq!(
        requests[1].entrypoint.as_deref(),
        Some(&["bundle".to_string(), "update".to_string()][..])
    );

    let commits = harness.source_control.commits();
    let files: Vec<&str> = commits[0].files.iter().map(|(path, _)| path.as_str()).collect();
    assert_eq!(files, ["api/Gemfile", "api/Gemfile.lock"]);

    let gemfile = &commits[0].files[0].1;
    assert!(gemfile.contains("gem 'rails', '~> 5.1.4'\n"));
    assert!(gemfile.contains("gem 'puma', '3.11.2'\n"));
    assert!(gemfile.contains("  gem 'rspec', '3.6.0'\n"));
    assert_eq!(commits[0].files[1].1, "regenerated\n");
}

#[tokio::test]
async fn dry_run_stops_before_publication() {
    let mut harness = javascript_harness(&fixture("javascript/outdated.json"));
    harness.ctx.dry_run = true;
    let repository = harness.store(repository("1"));

    let outcome = UpdatePipeline::new(harness.ctx.clone())
        .run(&repository, &ModuleConfig::new(".", "javascript"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ModuleOutcome::DryRun {
            dependencies: vec!["left-pad".to_string()]
        }
    );
    assert!(harness.host.created().is_empty());
    assert!(harness.source_control.commits().is_empty());
}
