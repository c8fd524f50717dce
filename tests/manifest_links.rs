mod common;

use std::path::Path;

use dfxdeploy::config::LinksSection;
use dfxdeploy::deploy::{CanisterKind, CanisterManifest, LinkBuilder};
use dfxdeploy::errors::DeployError;
use dfxdeploy::fs::mock::MockFileSystem;

#[test]
fn local_sample_is_classified() {
    let manifest = CanisterManifest::from_json(&common::local_manifest()).unwrap();
    let links = manifest.classify(&LinkBuilder::local(&LinksSection::default()));

    assert_eq!(links.candid_ui.as_deref(), Some("be2us-64aaa-aaaaa-qaabq-cai"));

    assert_eq!(links.frontends.len(), 1);
    let frontend = &links.frontends[0];
    assert_eq!(frontend.name, "hello_frontend");
    assert_eq!(frontend.kind, CanisterKind::Frontend);
    assert_eq!(
        frontend.url.as_deref(),
        Some("http://127.0.0.1:4943/?canisterId=bd3sg-teaaa-aaaaa-qaaba-cai")
    );

    assert_eq!(links.backends.len(), 1);
    let backend = &links.backends[0];
    assert_eq!(backend.name, "hello_backend");
    assert_eq!(backend.kind, CanisterKind::Backend);
    assert_eq!(
        backend.url.as_deref(),
        Some(
            "http://127.0.0.1:4943/?canisterId=be2us-64aaa-aaaaa-qaabq-cai&id=bkyz2-fmaaa-aaaaa-qaaaq-cai"
        )
    );
}

#[test]
fn backends_have_no_link_without_ui_canister() {
    let manifest = CanisterManifest::from_json(
        r#"{ "api": { "local": "aaaaa-aa" }, "web_frontend": { "local": "bbbbb-bb" } }"#,
    )
    .unwrap();
    let links = manifest.classify(&LinkBuilder::local(&LinksSection::default()));

    assert_eq!(links.candid_ui, None);
    assert_eq!(links.backends[0].url, None);
    assert!(links.frontends[0].url.is_some());
}

#[test]
fn entries_without_the_network_key_are_skipped() {
    let manifest = CanisterManifest::from_json(
        r#"{ "api": { "ic": "aaaaa-aa" }, "other": { "local": "ccccc-cc" } }"#,
    )
    .unwrap();
    let links = manifest.classify(&LinkBuilder::local(&LinksSection::default()));

    assert!(links.frontends.is_empty());
    assert_eq!(links.backends.len(), 1);
    assert_eq!(links.backends[0].name, "other");
}

#[test]
fn mainnet_links_use_subdomains_and_the_public_ui() {
    let manifest = CanisterManifest::from_json(&common::mainnet_manifest()).unwrap();
    let links = manifest.classify(&LinkBuilder::mainnet(&LinksSection::default(), "ic"));

    assert_eq!(links.candid_ui.as_deref(), Some("a4gq6-oaaaa-aaaab-qaa4q-cai"));
    assert_eq!(
        links.frontends[0].url.as_deref(),
        Some("https://u6s2n-gx777-77774-qaaba-cai.icp0.io/")
    );
    assert_eq!(
        links.backends[0].url.as_deref(),
        Some("https://a4gq6-oaaaa-aaaab-qaa4q-cai.raw.icp0.io/?id=uxrrr-q7777-77774-qaaaq-cai")
    );
}

#[test]
fn custom_ui_canister_name() {
    let links_cfg = LinksSection {
        candid_ui_name: "ui".to_string(),
        local_gateway: "http://localhost:8000/".to_string(),
        ..LinksSection::default()
    };
    let manifest = CanisterManifest::from_json(
        r#"{ "ui": { "local": "uuuuu-uu" }, "api": { "local": "aaaaa-aa" } }"#,
    )
    .unwrap();
    let links = manifest.classify(&LinkBuilder::local(&links_cfg));

    assert_eq!(links.backends.len(), 1);
    assert_eq!(
        links.backends[0].url.as_deref(),
        Some("http://localhost:8000/?canisterId=uuuuu-uu&id=aaaaa-aa")
    );
}

#[test]
fn unreadable_or_malformed_manifest() {
    let fs = MockFileSystem::new();
    let path = Path::new("/workspace/canister_ids.json");

    assert!(matches!(
        CanisterManifest::read(&fs, path),
        Err(DeployError::Io { .. })
    ));

    fs.add_file(path, "not json");
    assert!(matches!(
        CanisterManifest::read(&fs, path),
        Err(DeployError::Parse(_))
    ));
}
