//! Minimal model of the Android SDK class hierarchy.
//!
//! Only the classes the rules care about are modeled, by unqualified name.
//! Anything outside this table is unknown, and unknown never matches.

/// Direct superclass edges for the SDK classes the rules reason about.
static SUPERCLASSES: &[(&str, &str)] = &[
    ("ContextWrapper", "Context"),
    ("ContextThemeWrapper", "ContextWrapper"),
    ("Activity", "ContextThemeWrapper"),
    ("ListActivity", "Activity"),
    ("FragmentActivity", "Activity"),
    ("AppCompatActivity", "FragmentActivity"),
    ("Service", "ContextWrapper"),
    ("IntentService", "Service"),
    ("JobIntentService", "Service"),
    ("Application", "ContextWrapper"),
    ("MultiDexApplication", "Application"),
];

/// Direct superclass of an SDK class, if modeled.
pub fn superclass(class: &str) -> Option<&'static str> {
    SUPERCLASSES
        .iter()
        .find(|(c, _)| *c == class)
        .map(|(_, s)| *s)
}

/// Whether `class` is `target` or a transitive SDK subclass of it.
pub fn extends(class: &str, target: &str) -> bool {
    let mut current = class;
    loop {
        if current == target {
            return true;
        }
        match superclass(current) {
            Some(s) => current = s,
            None => return false,
        }
    }
}
