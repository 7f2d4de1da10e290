//! End-to-end resolution tests against real app directories.

use app_dispatcher::dispatch::script::RESERVED_ENTRIES;
use app_dispatcher::dispatch::{
    DispatchError, DispatchRequest, Dispatcher, RequestTarget, Resolution,
};

mod common;

use common::AppTree;

fn dispatch_name(dispatcher: &Dispatcher, host: &str, path: &str) -> Option<String> {
    let mut req = RequestTarget::new(host, path);
    dispatcher
        .dispatch(&mut req)
        .unwrap()
        .map(|env| env.app.name)
}

#[test]
fn test_reserved_entries_fall_back_to_default_app() {
    let tree = AppTree::new().app("home");
    for entry in RESERVED_ENTRIES {
        let mut config = tree.config();
        config.default_app = "home".into();
        config.entry = entry.into();
        let dispatcher = Dispatcher::new(&config);
        assert_eq!(dispatch_name(&dispatcher, "example.com", "/").as_deref(), Some("home"));
    }
}

#[test]
fn test_custom_entry_pins_app() {
    let tree = AppTree::new().app("admin").app("blog");
    let mut config = tree.config();
    config.entry = "admin".into();
    let dispatcher = Dispatcher::new(&config);

    let mut req = RequestTarget::new("example.com", "/blog/list");
    let env = dispatcher.dispatch(&mut req).unwrap().unwrap();
    assert_eq!(env.app.name, "admin");
    assert!(env.app.bound);
    assert_eq!(req.path_info(), "blog/list");
}

#[test]
fn test_domain_binding_precedence() {
    let tree = AppTree::new().app("shop").app("portal");
    let mut config = tree.config();
    config.domain_bind.insert("a.b.com".into(), "shop".into());
    config.domain_bind.insert("*".into(), "portal".into());
    let dispatcher = Dispatcher::new(&config);

    assert_eq!(dispatch_name(&dispatcher, "a.b.com", "/").as_deref(), Some("shop"));
    assert_eq!(dispatch_name(&dispatcher, "x.b.com", "/").as_deref(), Some("portal"));
}

#[test]
fn test_mapping_target_requested_directly_is_not_found() {
    let tree = AppTree::new().app("admin");
    let mut config = tree.config();
    config.app_map.insert("manage".into(), "admin".into());
    let dispatcher = Dispatcher::new(&config);

    let mut req = RequestTarget::new("example.com", "/admin/users");
    let err = dispatcher.dispatch(&mut req).unwrap_err();
    assert!(matches!(err, DispatchError::AppNotFound(ref name) if name == "admin"));
    assert_eq!(err.to_string(), "app not exists:admin");

    assert_eq!(
        dispatch_name(&dispatcher, "example.com", "/manage/users").as_deref(),
        Some("admin")
    );
}

#[test]
fn test_denied_app_is_not_found_even_if_present() {
    let tree = AppTree::new().app("common");
    let mut config = tree.config();
    config.deny_app_list.insert("common".into());
    let dispatcher = Dispatcher::new(&config);

    let mut req = RequestTarget::new("example.com", "/common");
    assert!(matches!(
        dispatcher.dispatch(&mut req),
        Err(DispatchError::AppNotFound(_))
    ));
}

#[test]
fn test_segment_extension_and_remainder() {
    let tree = AppTree::new().app("api");
    let dispatcher = Dispatcher::new(&tree.config());

    let mut dotted = RequestTarget::new("example.com", "/api.v2/users");
    let env = dispatcher.dispatch(&mut dotted).unwrap().unwrap();
    assert_eq!(env.app.name, "api");
    assert_eq!(dotted.root(), "/api");
    assert_eq!(dotted.path_info(), "users");

    let mut plain = RequestTarget::new("example.com", "/api/v2/users");
    dispatcher.dispatch(&mut plain).unwrap().unwrap();
    assert_eq!(plain.root(), "/api");
    assert_eq!(plain.path_info(), "v2/users");

    let mut bare = RequestTarget::new("example.com", "/api");
    dispatcher.dispatch(&mut bare).unwrap().unwrap();
    assert_eq!(bare.path_info(), "");
}

#[test]
fn test_resolution_is_idempotent() {
    let tree = AppTree::new().app("blog");
    let dispatcher = Dispatcher::new(&tree.config());

    let first = dispatcher
        .dispatch(&mut RequestTarget::new("example.com", "/blog/a"))
        .unwrap()
        .unwrap();
    let second = dispatcher
        .dispatch(&mut RequestTarget::new("example.com", "/blog/a"))
        .unwrap()
        .unwrap();
    assert_eq!(first.app, second.app);

    let mut req = RequestTarget::new("example.com", "/blog/a");
    let mut ctx = dispatcher.settings().context();
    let once = dispatcher.resolve(&mut ctx, &mut req).unwrap();
    let twice = dispatcher.resolve(&mut ctx, &mut req).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once, Resolution::Dispatch(first.app));
}

#[test]
fn test_missing_directory_with_and_without_express() {
    let tree = AppTree::new().app("index");

    let mut config = tree.config();
    config.app_express = true;
    let express = Dispatcher::new(&config);
    assert_eq!(dispatch_name(&express, "example.com", "/ghost/a").as_deref(), Some("index"));

    config.app_express = false;
    let strict = Dispatcher::new(&config);
    let mut req = RequestTarget::new("example.com", "/ghost/a");
    assert!(strict.dispatch(&mut req).unwrap().is_none());
    assert_eq!(req.path_info(), "ghost/a");
}

#[test]
fn test_config_files_load_in_either_creation_order() {
    let forward = AppTree::new()
        .file("shop/config/a.toml", "value = 1\n")
        .file("shop/config/b.toml", "value = 2\n");
    let backward = AppTree::new()
        .file("shop/config/b.toml", "value = 2\n")
        .file("shop/config/a.toml", "value = 1\n");

    for tree in [forward, backward] {
        let dispatcher = Dispatcher::new(&tree.config());
        let env = dispatcher
            .dispatch(&mut RequestTarget::new("example.com", "/shop"))
            .unwrap()
            .unwrap();
        assert_eq!(env.config("a.value").and_then(|v| v.as_integer()), Some(1));
        assert_eq!(env.config("b.value").and_then(|v| v.as_integer()), Some(2));
        assert_eq!(env.config.len(), 2);
    }
}

#[test]
fn test_full_app_resources_are_loaded() {
    let tree = AppTree::new()
        .file("shop/common.toml", "currency = \"EUR\"\n")
        .file("shop/config/database.toml", "host = \"db\"\n")
        .file("shop/event.toml", "[listen]\nOrderPaid = [\"mail\"]\n")
        .file("shop/middleware.toml", "middleware = [\"session\", \"auth\"]\n")
        .file("shop/provider.toml", "cache = \"redis\"\n")
        .file("shop/lang/zh-cn.toml", "hello = \"你好\"\n");
    let config = tree.config();
    let dispatcher = Dispatcher::new(&config);

    let env = dispatcher
        .dispatch(&mut RequestTarget::new("example.com", "/shop/cart"))
        .unwrap()
        .unwrap();

    assert_eq!(env.app.namespace, "app::shop");
    assert_eq!(env.app.runtime_path, config.runtime_path.join("shop"));
    assert_eq!(env.app.route_path, Some(tree.apps_dir().join("shop").join("route")));
    assert_eq!(env.globals.get("currency").and_then(|v| v.as_str()), Some("EUR"));
    assert_eq!(env.config("database.host").and_then(|v| v.as_str()), Some("db"));
    assert_eq!(env.events.listen["OrderPaid"], vec!["mail".to_string()]);
    assert_eq!(env.middleware, vec!["session".to_string(), "auth".to_string()]);
    assert_eq!(env.providers.get("cache").map(String::as_str), Some("redis"));
    assert_eq!(env.translate("hello"), "你好");
}

#[test]
fn test_reload_swaps_tables() {
    let tree = AppTree::new().app("shop").app("blog");
    let mut config = tree.config();
    config.app_map.insert("s".into(), "shop".into());
    let dispatcher = Dispatcher::new(&config);
    assert_eq!(dispatch_name(&dispatcher, "example.com", "/s").as_deref(), Some("shop"));

    config.app_map.insert("s".into(), "blog".into());
    dispatcher.reload(&config);
    assert_eq!(dispatch_name(&dispatcher, "example.com", "/s").as_deref(), Some("blog"));
}

#[test]
fn test_parent_directory_segment_is_not_an_app() {
    let tree = AppTree::new()
        .app("index")
        .file("../config/secrets.toml", "db_password = \"hunter2\"\n");
    let dispatcher = Dispatcher::new(&tree.config());

    for path in ["/../x", "/./x", "/%2E%2E/x"] {
        let mut req = RequestTarget::new("example.com", path);
        assert!(dispatcher.dispatch(&mut req).unwrap().is_none(), "{path}");
        assert_eq!(req.root(), "");
    }
}

#[test]
fn test_percent_encoded_app_name_matches() {
    let tree = AppTree::new().app("index").app("商店");
    let mut config = tree.config();
    config.deny_app_list.insert("common".into());
    config.app_express = true;
    let dispatcher = Dispatcher::new(&config);

    let mut denied = RequestTarget::new("example.com", "/%63ommon/x");
    assert!(matches!(
        dispatcher.dispatch(&mut denied),
        Err(DispatchError::AppNotFound(ref name)) if name == "common"
    ));

    let mut shop = RequestTarget::new("example.com", "/%E5%95%86%E5%BA%97/list");
    let env = dispatcher.dispatch(&mut shop).unwrap().unwrap();
    assert_eq!(env.app.name, "商店");
    assert_eq!(shop.path_info(), "list");
}

#[test]
fn test_entry_script_path_pins_app() {
    let tree = AppTree::new().app("admin").app("blog");
    let mut config = tree.config();
    config.entry = "public/admin.php".into();
    let dispatcher = Dispatcher::new(&config);
    assert_eq!(dispatch_name(&dispatcher, "example.com", "/blog").as_deref(), Some("admin"));
}
