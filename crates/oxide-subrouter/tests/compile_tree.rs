//! Tests for flattening router trees: prefixes, middleware inheritance and
//! registration order.

mod common;
use common::*;

use oxide_subrouter::Router;

#[test]
fn empty_root_registers_nothing() {
    assert!(flatten(Router::new()).is_empty());
}

#[test]
fn empty_children_register_nothing() {
    let mut root = Router::new();
    root.nest("/a").nest("/b");
    root.nest("");
    assert!(flatten(root).is_empty());
}

#[test]
fn grandchild_prefixes_concatenate() {
    let trace = Trace::new();
    let mut root = Router::new();
    root.nest("/org")
        .nest("/team/")
        .nest("members")
        .handle("GET /{id}", trace.handler("member"));

    assert_eq!(patterns(root), vec!["GET /org/team/members/{id}"]);
}

#[test]
fn slash_and_empty_prefixes_add_nothing() {
    let trace = Trace::new();
    let mut root = Router::new();
    root.nest("/").handle("/a", trace.handler("a"));
    root.nest("").handle("POST /b", trace.handler("b"));
    root.nest("//").nest("").handle("/c/", trace.handler("c"));

    assert_eq!(patterns(root), vec!["/a", "POST /b", "/c"]);
}

#[test]
fn registration_order_is_depth_first() {
    let trace = Trace::new();
    let mut root = Router::new();
    root.handle("/r1", trace.handler("r1"));
    {
        let a = root.nest("/a");
        a.handle("/a1", trace.handler("a1"));
        a.nest("/x").handle("/x1", trace.handler("x1"));
        a.handle("/a2", trace.handler("a2"));
    }
    root.nest("/b").handle("/b1", trace.handler("b1"));
    root.handle("/r2", trace.handler("r2"));

    assert_eq!(
        patterns(root),
        vec!["/r1", "/r2", "/a/a1", "/a/a2", "/a/x/x1", "/b/b1"]
    );
}

#[test]
fn duplicate_patterns_in_one_node_are_all_forwarded() {
    let trace = Trace::new();
    let mut root = Router::new();
    root.handle("GET /same", trace.handler("first"));
    root.handle("GET /same", trace.handler("second"));

    assert_eq!(patterns(root), vec!["GET /same", "GET /same"]);
}

#[tokio::test]
async fn grandchild_inherits_full_chain_in_order() {
    let trace = Trace::new();
    let mut root = Router::new();
    root.use_middleware(trace.layer("root"));
    let child = root.nest("/c");
    child.use_middleware(trace.layer("child"));
    let grandchild = child.nest("/g");
    grandchild.use_middleware(trace.layer("grand"));
    grandchild.handle("GET /leaf", trace.handler("leaf"));

    let routes = flatten(root);
    assert_eq!(routes[0].0, "GET /c/g/leaf");
    assert_eq!(
        run(&routes, "GET /c/g/leaf", &trace).await,
        vec!["root>", "child>", "grand>", "leaf", "<grand", "<child", "<root"]
    );
}

#[tokio::test]
async fn middleware_registered_after_routes_still_applies() {
    let trace = Trace::new();
    let mut root = Router::new();
    root.handle("/early", trace.handler("early"));
    root.nest("/kid").handle("/k", trace.handler("kid"));
    root.use_middleware(trace.layer("late"));

    let routes = flatten(root);
    assert_eq!(
        run(&routes, "/early", &trace).await,
        vec!["late>", "early", "<late"]
    );
    assert_eq!(
        run(&routes, "/kid/k", &trace).await,
        vec!["late>", "kid", "<late"]
    );
}

#[tokio::test]
async fn sibling_middleware_does_not_leak() {
    let trace = Trace::new();
    let mut root = Router::new();
    root.use_middleware(trace.layer("root"));
    root.handle("/parent", trace.handler("parent"));

    let left = root.nest("/left");
    left.use_middleware(trace.layer("left"));
    left.handle("/l", trace.handler("l"));

    let right = root.nest("/right");
    right.use_middleware(trace.layer("right"));
    right.handle("/r", trace.handler("r"));

    let routes = flatten(root);
    assert_eq!(
        run(&routes, "/parent", &trace).await,
        vec!["root>", "parent", "<root"]
    );
    assert_eq!(
        run(&routes, "/left/l", &trace).await,
        vec!["root>", "left>", "l", "<left", "<root"]
    );
    assert_eq!(
        run(&routes, "/right/r", &trace).await,
        vec!["root>", "right>", "r", "<right", "<root"]
    );
}

#[tokio::test]
async fn mounted_router_keeps_its_own_middleware() {
    let trace = Trace::new();
    let mut users = Router::new();
    users.use_middleware(trace.layer("users"));
    users.handle("GET /{id}", trace.handler("user"));

    let mut root = Router::new();
    root.use_middleware(trace.layer("root"));
    root.mount("/users", users);

    let routes = flatten(root);
    assert_eq!(
        run(&routes, "GET /users/{id}", &trace).await,
        vec!["root>", "users>", "user", "<users", "<root"]
    );
}
