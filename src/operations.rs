//! Traversal of `paths` → operations → parameters in document order.

use std::borrow::Cow;

use serde_json::Value;

use crate::resolver::RefResolver;
use crate::types::{Category, HTTP_METHODS};

/// Where a parameter is carried (`in` of an OpenAPI parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Header,
    Query,
}

impl ParameterLocation {
    /// Value of the parameter's `in` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Header => "header",
            ParameterLocation::Query => "query",
        }
    }

    /// Human label used in violation messages.
    pub fn label(&self) -> &'static str {
        match self {
            ParameterLocation::Header => "Header",
            ParameterLocation::Query => "Query parameter",
        }
    }

    /// Category of reserved-word violations for this location.
    pub fn reserved_category(&self) -> Category {
        match self {
            ParameterLocation::Header => Category::ReservedHeader,
            ParameterLocation::Query => Category::ReservedQueryParameter,
        }
    }

    /// Category of field-rule violations for this location.
    pub fn field_category(&self) -> Category {
        match self {
            ParameterLocation::Header => Category::Header,
            ParameterLocation::Query => Category::QueryParameter,
        }
    }
}

/// Case-insensitive name comparison used for headers and query parameters.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// One entry under `paths`.
#[derive(Debug, Clone, Copy)]
pub struct PathItem<'a> {
    pub path: &'a str,
    pub item: &'a Value,
}

impl<'a> PathItem<'a> {
    /// Parameters declared on the path item, shared by all its operations.
    pub fn parameters(&self) -> &'a [Value] {
        array(self.item, "parameters")
    }

    /// Operations of this path, in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = Operation<'a>> {
        let path = self.path;
        let shared = self.parameters();
        let item = self.item;

        item.as_object().into_iter().flat_map(move |map| {
            map.iter()
                .filter(|(method, op)| {
                    HTTP_METHODS.contains(&method.to_lowercase().as_str()) && op.is_object()
                })
                .map(move |(method, op)| Operation {
                    path,
                    method,
                    item: op,
                    shared,
                })
        })
    }
}

/// An HTTP-method-scoped entry under a path.
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    pub path: &'a str,
    /// Method key as written in the document (usually lower case).
    pub method: &'a str,
    pub item: &'a Value,
    shared: &'a [Value],
}

impl<'a> Operation<'a> {
    /// Upper-case method name, as used by the rule set and in messages.
    pub fn method_upper(&self) -> String {
        self.method.to_uppercase()
    }

    /// `GET /pets`
    pub fn describe(&self) -> String {
        format!("{} {}", self.method_upper(), self.path)
    }

    /// Parameters declared directly on the operation.
    pub fn parameters(&self) -> &'a [Value] {
        array(self.item, "parameters")
    }

    /// Find a parameter by location and case-insensitive name.
    ///
    /// Operation parameters are searched before path-level ones. `$ref`
    /// parameters are resolved first.
    pub fn find_parameter(
        &self,
        resolver: &RefResolver<'a>,
        location: ParameterLocation,
        name: &str,
    ) -> Option<Cow<'a, Value>> {
        self.parameters()
            .iter()
            .chain(self.shared.iter())
            .map(|param| resolver.deref(param))
            .find(|param| {
                param.get("in").and_then(Value::as_str) == Some(location.as_str())
                    && param
                        .get("name")
                        .and_then(Value::as_str)
                        .is_some_and(|n| names_match(n, name))
            })
    }

    /// The operation's `responses` object, if any.
    pub fn responses(&self) -> Option<&'a Value> {
        self.item.get("responses")
    }
}

/// All entries under `paths`, in document order.
pub fn path_items(document: &Value) -> impl Iterator<Item = PathItem<'_>> {
    document
        .get("paths")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|paths| paths.iter().map(|(path, item)| PathItem { path, item }))
}

/// All operations of the document, in document order.
pub fn operations(document: &Value) -> impl Iterator<Item = Operation<'_>> {
    path_items(document).flat_map(|item| item.operations())
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
