//! Convenience macros for plugin development.

/// Macro for building a [`PluginDescriptor`](crate::registry::PluginDescriptor)
/// targeting the current plugin API version.
///
/// # Example
/// ```rust,ignore
/// let info = plugin_descriptor!(
///     slug: "blink",
///     name: "Blink Indicator",
///     version: "1.0.0",
///     author: "Tanmatsu",
///     description: "Blinks a dot in the status bar",
///     kind: Service,
///     flags: AUTOSTART
/// );
/// ```
#[macro_export]
macro_rules! plugin_descriptor {
    (
        slug: $slug:expr,
        name: $name:expr,
        version: $version:expr,
        author: $author:expr,
        description: $desc:expr,
        kind: $kind:ident
    ) => {
        $crate::prelude::PluginDescriptor {
            name: $name.to_string(),
            slug: $slug.to_string(),
            version: $version.to_string(),
            author: $author.to_string(),
            description: $desc.to_string(),
            api_version: $crate::prelude::PLUGIN_API_VERSION,
            plugin_type: $crate::prelude::PluginType::$kind,
            flags: $crate::prelude::PluginFlags::NONE,
        }
    };
    (
        slug: $slug:expr,
        name: $name:expr,
        version: $version:expr,
        author: $author:expr,
        description: $desc:expr,
        kind: $kind:ident,
        flags: $($flag:ident)|+
    ) => {
        $crate::prelude::PluginDescriptor {
            name: $name.to_string(),
            slug: $slug.to_string(),
            version: $version.to_string(),
            author: $author.to_string(),
            description: $desc.to_string(),
            api_version: $crate::prelude::PLUGIN_API_VERSION,
            plugin_type: $crate::prelude::PluginType::$kind,
            flags: $crate::prelude::PluginFlags::NONE $(| $crate::prelude::PluginFlags::$flag)+,
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_descriptor_macro_sets_flags() {
        let info = plugin_descriptor!(
            slug: "key-led",
            name: "Key LED",
            version: "1.0.0",
            author: "tests",
            description: "",
            kind: Service,
            flags: AUTOSTART | NEEDS_LEDS
        );
        assert_eq!(info.api_version, PLUGIN_API_VERSION);
        assert!(info.flags.contains(PluginFlags::AUTOSTART | PluginFlags::NEEDS_LEDS));
        assert!(!info.flags.contains(PluginFlags::NEEDS_INPUT));
        assert!(info.check().is_ok());
    }

    #[test]
    fn test_descriptor_macro_without_flags() {
        let info = plugin_descriptor!(
            slug: "menu",
            name: "Menu",
            version: "0.1.0",
            author: "tests",
            description: "A menu",
            kind: Menu
        );
        assert_eq!(info.plugin_type, PluginType::Menu);
        assert_eq!(info.flags, PluginFlags::NONE);
    }
}
