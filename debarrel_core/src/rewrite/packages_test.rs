use std::panic::{AssertUnwindSafe, catch_unwind};

use super::packages::BarrelPackages;

struct UnconvertibleName;

impl From<UnconvertibleName> for String {
    fn from(_: UnconvertibleName) -> String {
        panic!("package name conversion failed")
    }
}

#[test]
fn names_are_trimmed_and_deduplicated() {
    let packages = BarrelPackages::new(["@acme/ui", " @acme/ui ", "", "lodash-es"]);
    assert_eq!(packages.names(), vec!["@acme/ui", "lodash-es"]);
    assert!(!packages.insert("lodash-es"));
    assert!(packages.insert("@acme/icons"));
    assert_eq!(packages.len(), 3);
}

#[test]
fn mentioned_in_scans_for_any_configured_name() {
    let packages = BarrelPackages::default();
    assert!(!packages.mentioned_in("import { a } from \"@acme/ui\";"));
    packages.insert("@acme/ui");
    assert!(packages.mentioned_in("import { a } from \"@acme/ui\";"));
    assert!(!packages.mentioned_in("import { a } from \"react\";"));
}

#[test]
fn a_panic_while_adding_names_does_not_disable_the_set() {
    let packages = BarrelPackages::new(["@acme/ui"]);
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        packages.extend([UnconvertibleName]);
    }));
    assert!(outcome.is_err());

    assert!(packages.contains("@acme/ui"));
    assert!(packages.mentioned_in("import { Button } from \"@acme/ui\";"));
    assert_eq!(packages.extend(["@acme/icons"]), 1);
    assert!(packages.mentioned_in("import { Star } from \"@acme/icons\";"));
}
