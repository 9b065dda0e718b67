//! Collision-free labels and names for copied or moved fields.

const LABEL_MARKER: &str = " (Copy";
const NAME_MARKER: &str = "_copy";

/// Copy index encoded in `label` relative to `base`: `1` for
/// `"<base> (Copy)"`, `n` for `"<base> (Copy n)"`.
fn label_copy_index(label: &str, base: &str) -> Option<u32> {
    let rest = label.strip_prefix(base)?;
    if rest == " (Copy)" {
        return Some(1);
    }
    rest.strip_prefix(" (Copy ")?
        .strip_suffix(')')?
        .parse()
        .ok()
        .filter(|n| *n >= 2)
}

/// Copy index encoded in `name` relative to `base`: `1` for
/// `"<base>_copy"`, `n` for `"<base>_copy_n"`.
fn name_copy_index(name: &str, base: &str) -> Option<u32> {
    let rest = name.strip_prefix(base)?;
    if rest == NAME_MARKER {
        return Some(1);
    }
    rest.strip_prefix("_copy_")?
        .parse()
        .ok()
        .filter(|n| *n >= 2)
}

/// Strips one copy suffix so copies of copies count against the original.
fn label_base(label: &str) -> &str {
    if let Some(index) = label.rfind(LABEL_MARKER) {
        let base = &label[..index];
        if label_copy_index(label, base).is_some() {
            return base;
        }
    }
    label
}

fn name_base(name: &str) -> &str {
    if let Some(index) = name.rfind(NAME_MARKER) {
        let base = &name[..index];
        if name_copy_index(name, base).is_some() {
            return base;
        }
    }
    name
}

/// Label for a copy of `label` that no sibling uses yet.
pub(crate) fn copy_label<'a>(label: &str, siblings: impl Iterator<Item = &'a str>) -> String {
    let base = label_base(label);
    let highest = siblings
        .filter_map(|existing| label_copy_index(existing, base))
        .max()
        .unwrap_or(0);
    match highest + 1 {
        1 => format!("{} (Copy)", base),
        n => format!("{} (Copy {})", base, n),
    }
}

/// Name for a copy of `name` that no sibling uses yet.
pub(crate) fn copy_name<'a>(name: &str, siblings: impl Iterator<Item = &'a str>) -> String {
    let base = name_base(name);
    let highest = siblings
        .filter_map(|existing| name_copy_index(existing, base))
        .max()
        .unwrap_or(0);
    match highest + 1 {
        1 => format!("{}_copy", base),
        n => format!("{}_copy_{}", base, n),
    }
}

/// `base`, or `base_2`, `base_3`… whichever is free first.
pub(crate) fn unique_name<'a>(base: &str, siblings: impl Iterator<Item = &'a str>) -> String {
    let taken: std::collections::HashSet<&str> = siblings.collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}
