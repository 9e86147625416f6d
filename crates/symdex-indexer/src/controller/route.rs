//! `@Route` annotations on controllers

use symdex_core::Route;

use super::annotations::DocTag;

/// Path of an `@Route` tag: first positional argument, or `value`/`path`/`pattern`
fn route_path(tag: &DocTag) -> Option<String> {
    let args = tag.arguments()?;
    args.value()
        .or_else(|| args.named("path"))
        .or_else(|| args.named("pattern"))
        .map(str::to_string)
}

/// Class-level `@Route("/prefix")`, prepended to every method route
pub fn route_prefix(tags: &[DocTag]) -> Option<String> {
    tags.iter()
        .filter(|tag| tag.is("Route"))
        .find_map(route_path)
}

/// Routes declared on a controller method
pub fn method_routes(
    tags: &[DocTag],
    prefix: Option<&str>,
    controller: &str,
    action: &str,
) -> Vec<Route> {
    let mut routes = Vec::new();
    let mut unnamed = 0;

    for tag in tags.iter().filter(|tag| tag.is("Route")) {
        let Some(args) = tag.arguments() else {
            continue;
        };
        let path = route_path(tag).unwrap_or_default();
        let pattern = format!("{}{}", prefix.unwrap_or(""), path);

        let name = match args.named("name") {
            Some(name) => name.to_string(),
            None => {
                let mut name = default_route_name(controller, action);
                if unnamed > 0 {
                    name = format!("{}_{}", name, unnamed);
                }
                unnamed += 1;
                name
            }
        };

        routes.push(Route::new(name, pattern, controller, action));
    }

    routes
}

/// Name Symfony gives a route declared without one
///
/// `Acme\BlogBundle\Controller\PostController::showAction` becomes
/// `acme_blog_post_show`.
pub fn default_route_name(controller: &str, action: &str) -> String {
    let name = format!("{}_{}", controller.replace('\\', "_"), action).to_lowercase();
    let name = name.replace("bundle_", "_").replace("controller_", "_");
    let mut name = name.strip_suffix("action").unwrap_or(&name).to_string();
    while name.contains("__") {
        name = name.replace("__", "_");
    }
    name
}
