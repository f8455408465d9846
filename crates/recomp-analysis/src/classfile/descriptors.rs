//! JVM type descriptor and internal-name helpers.

/// Convert an internal name (`com/x/Foo`) to a binary name (`com.x.Foo`).
pub fn binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Every object type mentioned in a field or method descriptor, as binary names.
///
/// `(ILjava/util/List;[Lcom/x/Foo;)V` yields `java.util.List` and `com.x.Foo`.
pub fn object_types(descriptor: &str) -> Vec<String> {
    let mut types = Vec::new();
    let mut rest = descriptor;
    while let Some(start) = rest.find('L') {
        let after = &rest[start + 1..];
        match after.find(';') {
            Some(end) => {
                types.push(binary_name(&after[..end]));
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    types
}

/// Resolve a `CONSTANT_Class` name. Array classes resolve to their element
/// type; primitive arrays resolve to nothing.
pub fn class_constant_type(name: &str) -> Option<String> {
    if name.starts_with('[') {
        object_types(name).into_iter().next()
    } else {
        Some(binary_name(name))
    }
}
