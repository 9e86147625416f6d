//! Variables handed from a controller to a template

/// What a template variable holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKind {
    /// An instance of `namespace\class_name`
    Reference {
        class_name: String,
        namespace: String,
    },
    /// A literal value
    Scalar,
}

/// A variable bound in a render call or an `@Template` return array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariable {
    /// Variable name as seen by the template (the array key)
    pub name: String,
    pub kind: VariableKind,
    /// Controller method the binding occurs in
    pub method: String,
    /// Full view path (`AcmeBlogBundle:Post:show.html.twig`)
    pub view_path: String,
    pub offset: u32,
    pub length: u32,
}

impl TemplateVariable {
    /// Identity used to collapse repeated bindings
    pub fn same_binding(&self, other: &TemplateVariable) -> bool {
        self.name == other.name && self.view_path == other.view_path && self.method == other.method
    }
}

/// Conventional view path of an action (`<Bundle>:<Controller>:<action>.html.twig`)
///
/// `None` when the namespace has no segment ending in `Bundle`.
pub fn default_view_path(namespace: Option<&str>, class_name: &str, method: &str) -> Option<String> {
    let namespace = namespace?;
    let mut bundle = String::new();
    let mut found = false;
    for segment in namespace.split('\\').filter(|s| !s.is_empty()) {
        bundle.push_str(segment);
        if segment.ends_with("Bundle") {
            found = true;
            break;
        }
    }
    if !found {
        return None;
    }

    let controller = class_name.strip_suffix("Controller").unwrap_or(class_name);
    let action = method.strip_suffix("Action").unwrap_or(method);
    Some(format!("{}:{}:{}.html.twig", bundle, controller, action))
}
