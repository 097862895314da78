//! Integration tests for the plugin lifecycle.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use helpers::{ScriptedPlugin, ServiceMode, TestHost};
use tanmatsu_plugin::prelude::*;
use tanmatsu_plugin::{PluginState, RecordingCanvas, ResourceKind};

#[tokio::test]
async fn test_unload_leaves_nothing_behind() {
    let app = TestHost::new();
    let mut plugin = ScriptedPlugin::service("full");
    plugin.leds = vec![0, 3];
    plugin.hooks = 2;
    plugin.widgets = 3;
    let (plugin, probe) = plugin.shared();

    app.manager.load(plugin).await.unwrap();
    assert_eq!(app.manager.state("full").await, PluginState::Running);

    let held = app.host.holdings("full");
    assert_eq!(held.hooks, 2);
    assert_eq!(held.widgets, 3);
    assert_eq!(held.claims, vec![(ResourceKind::Led, 0), (ResourceKind::Led, 3)]);

    app.manager.unload("full").await.unwrap();

    assert!(app.host.holdings("full").is_empty());
    assert_eq!(app.host.table_sizes(), (0, 0, 0));
    assert_eq!(app.manager.state("full").await, PluginState::Unloaded);
    assert_eq!(probe.cleanups(), 1);
    assert!(!probe.cleanup_saw_service_running.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_untidy_plugin_is_force_purged() {
    let app = TestHost::new();
    let mut plugin = ScriptedPlugin::new("messy", PluginType::Menu);
    plugin.leds = vec![1];
    plugin.hooks = 1;
    plugin.widgets = 1;
    plugin.tidy = false;
    let (plugin, _probe) = plugin.shared();

    app.manager.load(plugin).await.unwrap();
    app.manager.unload("messy").await.unwrap();

    assert_eq!(app.host.table_sizes(), (0, 0, 0));
    app.host.admit("other").unwrap();
    assert!(app.host.claim("other", ResourceKind::Led, 1));
}

#[tokio::test]
async fn test_init_failure_rolls_back_claims() {
    let app = TestHost::new();
    let mut plugin = ScriptedPlugin::service("broken");
    plugin.leds = vec![2];
    plugin.hooks = 1;
    plugin.fail_after_claims = true;
    let (plugin, probe) = plugin.shared();

    let err = app.manager.load(plugin).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::InitFailed);
    assert_eq!(app.host.table_sizes(), (0, 0, 0));
    assert_eq!(app.manager.state("broken").await, PluginState::Unloaded);
    assert_eq!(probe.cleanups(), 0);

    // The LED is free for the next plugin.
    let mut next = ScriptedPlugin::new("next", PluginType::Menu);
    next.leds = vec![2];
    app.manager.load(next.shared().0).await.unwrap();
}

#[tokio::test]
async fn test_claim_conflict_fails_init() {
    let app = TestHost::new();
    let mut first = ScriptedPlugin::new("first", PluginType::Menu);
    first.leds = vec![0];
    app.manager.load(first.shared().0).await.unwrap();

    let mut second = ScriptedPlugin::new("second", PluginType::Menu);
    second.leds = vec![0];
    let err = app.manager.load(second.shared().0).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InitFailed);
    assert_eq!(
        app.host.holdings("first").claims,
        vec![(ResourceKind::Led, 0)]
    );
}

#[tokio::test]
async fn test_cleanup_runs_once_after_service_error() {
    let app = TestHost::new();
    let mut plugin = ScriptedPlugin::service("failing");
    plugin.service = ServiceMode::Failing;
    let (plugin, probe) = plugin.shared();

    app.manager.load(plugin).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    app.manager.unload("failing").await.unwrap();

    assert_eq!(probe.cleanups(), 1);
    assert!(app.manager.unload("failing").await.is_err());
    assert_eq!(probe.cleanups(), 1);
}

#[tokio::test]
async fn test_cleanup_runs_after_service_panic() {
    let app = TestHost::new();
    let mut plugin = ScriptedPlugin::service("panicky");
    plugin.service = ServiceMode::Panicking;
    plugin.widgets = 1;
    let (plugin, probe) = plugin.shared();

    app.manager.load(plugin).await.unwrap();
    app.manager.unload("panicky").await.unwrap();

    assert_eq!(probe.cleanups(), 1);
    assert_eq!(app.host.table_sizes(), (0, 0, 0));
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_service_is_revoked_then_reaped() {
    let app = TestHost::with_stop_timeout(100);
    let mut plugin = ScriptedPlugin::service("stubborn");
    plugin.service = ServiceMode::Stubborn;
    plugin.leds = vec![4];
    plugin.hooks = 1;
    plugin.widgets = 1;
    let (plugin, probe) = plugin.shared();

    app.manager.load(plugin).await.unwrap();

    let err = app.manager.unload("stubborn").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ServiceUnresponsive);

    // Registrations are gone at once; cleanup waits for the task.
    assert_eq!(app.host.table_sizes(), (0, 0, 0));
    assert!(!app.host.is_admitted("stubborn"));
    assert_eq!(probe.cleanups(), 0);
    assert_eq!(app.manager.state("stubborn").await, PluginState::Stopping);

    probe.release_service.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(probe.cleanups(), 1);
    assert!(!probe.cleanup_saw_service_running.load(Ordering::SeqCst));
    assert_eq!(app.manager.state("stubborn").await, PluginState::Unloaded);
}

#[tokio::test]
async fn test_descriptor_checks() {
    let app = TestHost::new();

    let mut wrong_api = ScriptedPlugin::new("future", PluginType::Menu);
    wrong_api.api_version = PLUGIN_API_VERSION + 1;
    let err = app.manager.load(wrong_api.shared().0).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let bad_slug = ScriptedPlugin::new("Bad Slug", PluginType::Menu);
    let err = app.manager.load(bad_slug.shared().0).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let (first, _) = ScriptedPlugin::new("twin", PluginType::Menu).shared();
    let (second, probe) = ScriptedPlugin::new("twin", PluginType::Menu).shared();
    app.manager.load(first).await.unwrap();
    let err = app.manager.load(second).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(probe.inits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_hook_plugin_receives_events() {
    let app = TestHost::new();
    let (plugin, probe) = ScriptedPlugin::new("keys", PluginType::Hook).shared();
    app.manager.load(plugin).await.unwrap();

    assert!(app.host.dispatch_input(&InputEvent::key('a')).propagate());
    let result = app.host.dispatch_input(&InputEvent::key('q'));
    assert!(result.consumed);
    assert_eq!(result.consumed_owner.as_deref(), Some("keys"));
    assert_eq!(probe.events.load(Ordering::SeqCst), 2);

    app.manager.unload("keys").await.unwrap();
    app.host.dispatch_input(&InputEvent::key('q'));
    assert_eq!(probe.events.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_hook_plugin_without_free_hook_slot_rolls_back() {
    let mut config = tanmatsu_core::config::HostConfig::default();
    config.plugins.max_hooks = 1;
    let app = TestHost::with_config(config);

    let mut first = ScriptedPlugin::service("first");
    first.hooks = 1;
    let (first, _) = first.shared();
    app.manager.load(first).await.unwrap();

    let mut keys = ScriptedPlugin::new("keys", PluginType::Hook);
    keys.leds = vec![1];
    let (keys, probe) = keys.shared();
    let err = app.manager.load(keys).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::InitFailed);
    assert_eq!(probe.inits.load(Ordering::SeqCst), 1);
    assert_eq!(probe.cleanups(), 1);
    assert!(app.host.holdings("keys").is_empty());
    assert_eq!(app.manager.state("keys").await, PluginState::Unloaded);
    assert_eq!(app.host.table_sizes(), (1, 0, 0));

    app.manager.unload_all().await;
}

#[tokio::test]
async fn test_menu_plugin_render_and_select() {
    let app = TestHost::new();
    let (menu, probe) = ScriptedPlugin::new("menu", PluginType::Menu).shared();
    let (service, _) = ScriptedPlugin::service("svc").shared();
    app.manager.load(menu).await.unwrap();
    app.manager.load(service).await.unwrap();

    let mut canvas = RecordingCanvas::new();
    app.manager.render_menu("menu", &mut canvas).await.unwrap();
    assert_eq!(canvas.ops().len(), 1);

    app.manager.select_menu("menu").await.unwrap();
    assert_eq!(probe.menu_selects.load(Ordering::SeqCst), 1);

    let err = app.manager.select_menu("svc").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = app.manager.select_menu("missing").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    app.manager.unload_all().await;
}

#[tokio::test]
async fn test_load_all_honours_autostart_and_disabled() {
    let mut config = tanmatsu_core::config::HostConfig::default();
    config.plugins.disabled = vec!["skipped".to_string()];
    let app = TestHost::with_config(config);

    let mut manual = ScriptedPlugin::service("manual");
    manual.flags = PluginFlags::NONE;

    let plugins: Vec<Arc<dyn Plugin>> = vec![
        ScriptedPlugin::service("alpha").shared().0,
        manual.shared().0,
        ScriptedPlugin::service("skipped").shared().0,
        ScriptedPlugin::new("beta", PluginType::Menu).shared().0,
    ];

    let loaded = app.manager.load_all(plugins).await;
    assert_eq!(loaded, vec!["alpha".to_string(), "beta".to_string()]);

    let listing = app.manager.list_plugins().await;
    let slugs: Vec<&str> = listing.iter().map(|s| s.descriptor.slug.as_str()).collect();
    assert_eq!(slugs, vec!["alpha", "beta"]);
    assert!(listing.iter().all(|s| s.state == PluginState::Running));

    app.manager.unload_all().await;
    assert!(app.manager.list_plugins().await.is_empty());
    assert!(!app.manager.is_loaded("alpha").await);
}
