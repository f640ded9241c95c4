//! XML document transform engine
//!
//! Applies an overlay document, annotated with `xdt:Transform` and
//! `xdt:Locator` attributes, onto a base document. Overlay elements are
//! paired with base elements of the same name under the same parent; a
//! `Match(attr, ...)` locator narrows the pairing to elements whose listed
//! attributes agree.

use super::document::{XmlDocument, XmlElement, XmlNode};

/// Namespace URI that marks transform attributes.
pub const XDT_NAMESPACE: &str = "http://schemas.microsoft.com/XML-Document-Transform";

const DEFAULT_PREFIX: &str = "xdt";

/// Errors that abort a transform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("root element mismatch: document has <{document}>, transform has <{transform}>")]
    RootMismatch { document: String, transform: String },

    #[error("unsupported transform '{verb}' on <{element}>")]
    UnsupportedTransform { verb: String, element: String },

    #[error("unsupported locator '{locator}' on <{element}>")]
    UnsupportedLocator { locator: String, element: String },

    #[error("document has no root element")]
    MissingRoot,
}

/// What a transform run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Number of transform operations performed.
    pub applied: usize,
    /// Non-fatal problems, such as a locator that matched nothing.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Verb {
    Replace,
    Insert,
    InsertIfMissing,
    Remove,
    RemoveAll,
    SetAttributes(Option<Vec<String>>),
    RemoveAttributes(Vec<String>),
}

/// A parsed transform (overlay) document.
#[derive(Debug, Clone)]
pub struct XmlTransformation {
    document: XmlDocument,
    prefix: String,
}

impl XmlTransformation {
    pub fn new(document: XmlDocument) -> Self {
        let prefix = document
            .root()
            .and_then(|root| {
                root.attributes().iter().find_map(|a| {
                    a.name
                        .strip_prefix("xmlns:")
                        .filter(|_| a.value == XDT_NAMESPACE)
                        .map(str::to_string)
                })
            })
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        Self { document, prefix }
    }

    /// Apply this transform to `target` in place.
    pub fn apply(&self, target: &mut XmlDocument) -> Result<TransformReport, TransformError> {
        let overlay_root = self.document.root().ok_or(TransformError::MissingRoot)?;
        let base_root = target.root_mut().ok_or(TransformError::MissingRoot)?;

        if base_root.name() != overlay_root.name() {
            return Err(TransformError::RootMismatch {
                document: base_root.name().to_string(),
                transform: overlay_root.name().to_string(),
            });
        }

        let mut report = TransformReport::default();
        let path = format!("/{}", overlay_root.name());
        self.apply_children(base_root, overlay_root, &path, &mut report)?;
        Ok(report)
    }

    fn attr_name(&self, local: &str) -> String {
        format!("{}:{}", self.prefix, local)
    }

    fn apply_children(
        &self,
        base: &mut XmlElement,
        overlay: &XmlElement,
        path: &str,
        report: &mut TransformReport,
    ) -> Result<(), TransformError> {
        for child in overlay.child_elements() {
            let child_path = format!("{path}/{}", child.name());
            let verb = self.verb_of(child)?;
            let keys = self.locator_keys(child)?;

            let matches: Vec<usize> = base
                .children
                .iter()
                .enumerate()
                .filter_map(|(i, node)| match node {
                    XmlNode::Element(e) if locates(e, child, keys.as_deref()) => Some(i),
                    _ => None,
                })
                .collect();

            let Some(verb) = verb else {
                if matches.is_empty() {
                    report
                        .warnings
                        .push(format!("no element matches {child_path}"));
                }
                for i in matches {
                    if let XmlNode::Element(target) = &mut base.children[i] {
                        self.apply_children(target, child, &child_path, report)?;
                    }
                }
                continue;
            };

            let descends = matches!(verb, Verb::SetAttributes(_) | Verb::RemoveAttributes(_));
            if !descends && self.has_nested_transforms(child) {
                report
                    .warnings
                    .push(format!("nested transforms under {child_path} ignored"));
            }

            match verb {
                Verb::Insert => {
                    base.append_child(self.clean(child));
                    report.applied += 1;
                }
                Verb::InsertIfMissing => {
                    if matches.is_empty() {
                        base.append_child(self.clean(child));
                        report.applied += 1;
                    }
                }
                _ if matches.is_empty() => {
                    report
                        .warnings
                        .push(format!("no element matches {child_path}"));
                }
                Verb::Replace => {
                    base.children[matches[0]] = XmlNode::Element(self.clean(child));
                    report.applied += 1;
                }
                Verb::Remove => {
                    base.remove_child(matches[0]);
                    report.applied += 1;
                }
                Verb::RemoveAll => {
                    for &i in matches.iter().rev() {
                        base.remove_child(i);
                    }
                    report.applied += matches.len();
                }
                Verb::SetAttributes(names) => {
                    let source: Vec<(String, String)> = child
                        .attributes()
                        .iter()
                        .filter(|a| !self.is_transform_attribute(&a.name))
                        .filter(|a| names.as_ref().map_or(true, |n| n.contains(&a.name)))
                        .map(|a| (a.name.clone(), a.value.clone()))
                        .collect();
                    for &i in &matches {
                        if let XmlNode::Element(target) = &mut base.children[i] {
                            for (name, value) in &source {
                                target.set_attribute(name, value);
                            }
                            self.apply_children(target, child, &child_path, report)?;
                        }
                    }
                    report.applied += matches.len();
                }
                Verb::RemoveAttributes(names) => {
                    for &i in &matches {
                        if let XmlNode::Element(target) = &mut base.children[i] {
                            for name in &names {
                                target.remove_attribute(name);
                            }
                            self.apply_children(target, child, &child_path, report)?;
                        }
                    }
                    report.applied += matches.len();
                }
            }
        }
        Ok(())
    }

    fn verb_of(&self, element: &XmlElement) -> Result<Option<Verb>, TransformError> {
        let Some(raw) = element.attribute(&self.attr_name("Transform")) else {
            return Ok(None);
        };
        let (name, args) = parse_call(raw);
        let unsupported = || TransformError::UnsupportedTransform {
            verb: raw.to_string(),
            element: element.name().to_string(),
        };
        let verb = match (name, args) {
            ("Replace", None) => Verb::Replace,
            ("Insert", None) => Verb::Insert,
            ("InsertIfMissing", None) => Verb::InsertIfMissing,
            ("Remove", None) => Verb::Remove,
            ("RemoveAll", None) => Verb::RemoveAll,
            ("SetAttributes", args) => Verb::SetAttributes(args),
            ("RemoveAttributes", Some(args)) if !args.is_empty() => Verb::RemoveAttributes(args),
            _ => return Err(unsupported()),
        };
        Ok(Some(verb))
    }

    fn locator_keys(&self, element: &XmlElement) -> Result<Option<Vec<String>>, TransformError> {
        let Some(raw) = element.attribute(&self.attr_name("Locator")) else {
            return Ok(None);
        };
        match parse_call(raw) {
            ("Match", Some(keys)) if !keys.is_empty() => Ok(Some(keys)),
            _ => Err(TransformError::UnsupportedLocator {
                locator: raw.to_string(),
                element: element.name().to_string(),
            }),
        }
    }

    /// Whether any descendant of `element` carries a `Transform` attribute.
    fn has_nested_transforms(&self, element: &XmlElement) -> bool {
        let transform = self.attr_name("Transform");
        element
            .child_elements()
            .any(|c| c.attribute(&transform).is_some() || self.has_nested_transforms(c))
    }

    fn is_transform_attribute(&self, name: &str) -> bool {
        name.strip_prefix(&self.prefix)
            .is_some_and(|rest| rest.starts_with(':'))
            || name == format!("xmlns:{}", self.prefix)
    }

    /// Deep copy of an overlay element without transform attributes.
    fn clean(&self, element: &XmlElement) -> XmlElement {
        let mut copy = element.clone();
        self.strip(&mut copy);
        copy
    }

    fn strip(&self, element: &mut XmlElement) {
        let doomed: Vec<String> = element
            .attributes()
            .iter()
            .filter(|a| self.is_transform_attribute(&a.name))
            .map(|a| a.name.clone())
            .collect();
        for name in doomed {
            element.remove_attribute(&name);
        }
        for child in &mut element.children {
            if let XmlNode::Element(e) = child {
                self.strip(e);
            }
        }
    }
}

/// Same name and, when keys are given, equal values for every key.
fn locates(candidate: &XmlElement, overlay: &XmlElement, keys: Option<&[String]>) -> bool {
    if candidate.name() != overlay.name() {
        return false;
    }
    match keys {
        None => true,
        Some(keys) => keys
            .iter()
            .all(|k| candidate.attribute(k) == overlay.attribute(k)),
    }
}

/// Split `Name(a, b)` into `("Name", Some(["a", "b"]))`; `Name` gives `None`.
fn parse_call(raw: &str) -> (&str, Option<Vec<String>>) {
    let raw = raw.trim();
    match raw.split_once('(') {
        Some((name, rest)) => {
            let inner = rest.strip_suffix(')').unwrap_or(rest);
            let args = inner
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            (name.trim(), Some(args))
        }
        None => (raw, None),
    }
}
