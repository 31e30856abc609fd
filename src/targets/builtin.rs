//! Built-in target list for Windows workstations.

use std::path::{Path, PathBuf};

use super::paths::under;
use super::{BaseDirs, FilePattern, Method, SafetyClass, Target};
use crate::error::ConfigError;

/// File-name glob for Explorer thumbnail databases.
pub const THUMBCACHE_PATTERN: &str = "thumbcache*.db";

const KEEPS_LOGINS: &str = "Bookmarks and logins are kept";
const REBUILT_ON_LAUNCH: &str = "Rebuilt automatically on next launch";
const KEEPS_SETTINGS: &str = "Extensions and settings are kept";
const KEEPS_ACCOUNT: &str = "Account and servers are kept";
const PACKAGES_REFETCHED: &str = "Rebuilt automatically; the next install is slower";

fn dir(id: &str, label: &str, safety: SafetyClass, path: PathBuf, hint: &str) -> Target {
    Target::new(id, label, safety, Method::PlainDirectory { path }, hint)
}

/// `Cache`, `Code Cache` and `GPUCache` below a Chromium-style profile directory.
fn chromium_caches(prefix: &str, browser: &str, profile: &Path) -> Vec<Target> {
    vec![
        dir(
            &format!("{}-cache", prefix),
            &format!("{} cache", browser),
            SafetyClass::Safe,
            profile.join("Cache"),
            KEEPS_LOGINS,
        ),
        dir(
            &format!("{}-codecache", prefix),
            &format!("{} code cache", browser),
            SafetyClass::Safe,
            profile.join("Code Cache"),
            REBUILT_ON_LAUNCH,
        ),
        dir(
            &format!("{}-gpucache", prefix),
            &format!("{} GPU cache", browser),
            SafetyClass::Safe,
            profile.join("GPUCache"),
            REBUILT_ON_LAUNCH,
        ),
    ]
}

/// GPU and service worker caches shared by Electron applications.
fn electron_caches(prefix: &str, app: &str, root: &Path, hint: &str) -> Vec<Target> {
    vec![
        dir(
            &format!("{}-gpucache", prefix),
            &format!("{} GPU cache", app),
            SafetyClass::Safe,
            root.join("GPUCache"),
            REBUILT_ON_LAUNCH,
        ),
        dir(
            &format!("{}-swcache", prefix),
            &format!("{} service worker cache", app),
            SafetyClass::Safe,
            under(root, &["Service Worker", "CacheStorage"]),
            hint,
        ),
    ]
}

/// The built-in targets, in scan order.
pub fn builtin_targets(dirs: &BaseDirs) -> Result<Vec<Target>, ConfigError> {
    let local = dirs.local_app_data.as_path();
    let roaming = dirs.roaming_app_data.as_path();
    let mut targets = Vec::new();

    // Temporary directories
    targets.push(dir(
        "temp-os",
        "System temp files (current session)",
        SafetyClass::Safe,
        dirs.temp.clone(),
        "Removes leftover temporary files",
    ));
    targets.push(dir(
        "temp-local",
        r"User temp files (Local\Temp)",
        SafetyClass::Safe,
        local.join("Temp"),
        "Cleans the per-user temp directory",
    ));

    // Chromium browsers, default profile
    let chrome = under(local, &["Google", "Chrome", "User Data", "Default"]);
    targets.extend(chromium_caches("chrome", "Chrome", &chrome));
    let edge = under(local, &["Microsoft", "Edge", "User Data", "Default"]);
    targets.extend(chromium_caches("edge", "Edge", &edge));

    targets.push(Target::new(
        "firefox-cache",
        "Firefox cache",
        SafetyClass::Safe,
        Method::MultiProfileCache {
            path: under(roaming, &["Mozilla", "Firefox", "Profiles"]),
        },
        KEEPS_LOGINS,
    ));

    let brave = under(
        local,
        &["BraveSoftware", "Brave-Browser", "User Data", "Default"],
    );
    targets.extend(chromium_caches("brave", "Brave", &brave));
    let vivaldi = under(local, &["Vivaldi", "User Data", "Default"]);
    targets.extend(chromium_caches("vivaldi", "Vivaldi", &vivaldi));
    let opera = under(roaming, &["Opera Software", "Opera Stable"]);
    targets.extend(chromium_caches("opera", "Opera", &opera));

    // Editors and chat
    let code = roaming.join("Code");
    targets.push(dir(
        "vscode-cache",
        "VS Code cache",
        SafetyClass::Safe,
        code.join("Cache"),
        KEEPS_SETTINGS,
    ));
    targets.push(dir(
        "vscode-cacheddata",
        "VS Code CachedData",
        SafetyClass::Safe,
        code.join("CachedData"),
        KEEPS_SETTINGS,
    ));
    targets.extend(electron_caches("vscode", "VS Code", &code, KEEPS_SETTINGS));

    let discord = roaming.join("discord");
    targets.push(dir(
        "discord-cache",
        "Discord cache",
        SafetyClass::Safe,
        discord.join("Cache"),
        KEEPS_ACCOUNT,
    ));
    targets.push(dir(
        "discord-codecache",
        "Discord code cache",
        SafetyClass::Safe,
        discord.join("Code Cache"),
        REBUILT_ON_LAUNCH,
    ));
    targets.extend(electron_caches("discord", "Discord", &discord, KEEPS_ACCOUNT));

    // Package manager caches
    targets.push(dir(
        "npm-cache",
        "npm cache",
        SafetyClass::Safe,
        roaming.join("npm-cache"),
        PACKAGES_REFETCHED,
    ));
    targets.push(dir(
        "yarn-cache",
        "Yarn cache",
        SafetyClass::Safe,
        under(local, &["Yarn", "Cache"]),
        PACKAGES_REFETCHED,
    ));
    targets.push(dir(
        "pnpm-store",
        "pnpm store",
        SafetyClass::Optional,
        under(local, &["pnpm", "store"]),
        "Rebuilt automatically; can be large with many projects",
    ));
    targets.push(dir(
        "pnpm-store-v3",
        "pnpm store (v3)",
        SafetyClass::Optional,
        under(local, &["pnpm", "store-v3"]),
        "Rebuilt automatically; can be large with many projects",
    ));

    targets.push(Target::new(
        "recycle-bin",
        "Recycle Bin",
        SafetyClass::Safe,
        Method::SystemTrash,
        "Empties the recycle bin on every drive",
    ));

    targets.push(Target::new(
        "thumbcache",
        "Windows thumbnail cache",
        SafetyClass::Safe,
        Method::PatternMatch {
            path: under(local, &["Microsoft", "Windows", "Explorer"]),
            pattern: FilePattern::new(THUMBCACHE_PATTERN)?,
        },
        "Rebuilt by the system; opening picture folders is slower at first",
    ));

    // System-wide caches, may need administrator rights
    let system = dirs.system_root.as_path();
    targets.push(dir(
        "winupdate",
        "Windows Update download cache",
        SafetyClass::Optional,
        under(system, &["SoftwareDistribution", "Download"]),
        "Frees disk space; may need administrator rights",
    ));
    targets.push(dir(
        "delivery-opt",
        "Delivery Optimization cache",
        SafetyClass::Optional,
        under(system, &["SoftwareDistribution", "DeliveryOptimization"]),
        "Peer-to-peer update cache; may need administrator rights",
    ));
    targets.push(dir(
        "wer",
        "Windows Error Reporting (WER)",
        SafetyClass::Optional,
        under(&dirs.program_data, &["Microsoft", "Windows", "WER"]),
        "Error reports and dumps; may need administrator rights",
    ));
    targets.push(dir(
        "prefetch",
        "System Prefetch",
        SafetyClass::Optional,
        system.join("Prefetch"),
        "Regenerated by Windows; may need administrator rights",
    ));

    Ok(targets)
}
