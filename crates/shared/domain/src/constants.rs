//! String identifiers shared by the registry, the validator and the modules.

/// Logical name every infrastructure section must define.
pub const DEFAULT: &str = "default";

/// Top-level configuration keys.
pub mod section {
    pub const MODULES: &str = "modules";
    pub const DATABASE: &str = "database";
    pub const MAILER: &str = "mailer";
}

/// Module names, which double as their configuration subtree keys.
pub mod module {
    pub const ADMIN: &str = "admin";
    pub const AUTHOR: &str = "author";
    pub const MERCHANT: &str = "merchant";
    pub const SCOUT: &str = "scout";
}

/// Action categories (first registry level).
pub mod verb {
    pub const GET: &str = "get";
    pub const SET: &str = "set";
    pub const CREATE: &str = "create";
    pub const EDIT: &str = "edit";
    pub const REMOVE: &str = "remove";
    pub const ADD: &str = "add";
    pub const PUBLISH: &str = "publish";
    pub const LOGIN: &str = "login";
    pub const AUTHORIZE: &str = "authorize";
    pub const COMPLETE: &str = "complete";
    pub const ALLOW: &str = "allow";
    pub const RESTRICT: &str = "restrict";
    pub const VALIDATE: &str = "validate";
    pub const SANITIZE: &str = "sanitize";
}

/// Entity names (second registry level).
pub mod noun {
    pub const DATABASE: &str = "database";
    pub const MAILER: &str = "mailer";

    pub const EMAIL: &str = "email";
    pub const EQUAL: &str = "equal";
    pub const PASSWORD: &str = "password";
    pub const FIELDS: &str = "fields";
    pub const STRING: &str = "string";
    pub const HTML: &str = "html";

    pub const ADMIN: &str = "admin";
    pub const POST: &str = "post";
    pub const PAGE: &str = "page";
    pub const PRODUCT: &str = "product";
    pub const CART: &str = "cart";
    pub const CHARGE: &str = "charge";
    pub const VISIT: &str = "visit";
    pub const RULE: &str = "rule";
    pub const ADDRESS: &str = "address";
}
