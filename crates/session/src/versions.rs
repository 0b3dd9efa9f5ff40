//! Protocol version registry.
//!
//! A static table maps each supported browser major version to the domain
//! catalog shipped for it - resolved once at construction, no runtime
//! loading. A requested version outside the table falls back to the
//! nearest supported one instead of failing; exact ties round down.
//!
//! The catalog only describes which domain methods and events exist for
//! the loaded version. It never alters dispatch.

/// Supported major versions, ascending.
pub const SUPPORTED_VERSIONS: &[u32] = &[118, 124, 131, 136];

/// Newest supported major version.
pub const LATEST_VERSION: u32 = 136;

#[derive(Debug, Clone, Copy)]
pub struct Domain {
    pub name: &'static str,
    pub commands: &'static [&'static str],
    pub events: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct VersionCatalog {
    pub version: u32,
    pub domains: &'static [Domain],
}

impl VersionCatalog {
    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|domain| domain.name == name)
    }

    /// Whether a `Domain.command` method exists in this catalog.
    pub fn supports_method(&self, method: &str) -> bool {
        let Some((domain, command)) = method.split_once('.') else {
            return false;
        };
        self.domain(domain)
            .is_some_and(|d| d.commands.contains(&command))
    }

    /// Whether a `Domain.event` notification exists in this catalog.
    pub fn supports_event(&self, event: &str) -> bool {
        let Some((domain, name)) = event.split_once('.') else {
            return false;
        };
        self.domain(domain).is_some_and(|d| d.events.contains(&name))
    }
}

/// Picks the supported version with minimum absolute distance to the
/// requested one. Equidistant requests resolve to the lower candidate.
pub fn nearest_supported(requested: u32) -> u32 {
    let mut best = SUPPORTED_VERSIONS[0];
    for &candidate in SUPPORTED_VERSIONS {
        if requested.abs_diff(candidate) < requested.abs_diff(best) {
            best = candidate;
        }
    }
    best
}

/// Loads the catalog for the nearest supported version.
pub fn load(requested: u32) -> &'static VersionCatalog {
    match nearest_supported(requested) {
        118 => &V118,
        124 => &V124,
        131 => &V131,
        _ => &V136,
    }
}

const TARGET: Domain = Domain {
    name: "Target",
    commands: &[
        "getTargets",
        "attachToTarget",
        "detachFromTarget",
        "createTarget",
        "closeTarget",
        "getTargetInfo",
        "setDiscoverTargets",
    ],
    events: &[
        "targetCreated",
        "targetDestroyed",
        "targetInfoChanged",
        "attachedToTarget",
        "detachedFromTarget",
    ],
};

const PAGE: Domain = Domain {
    name: "Page",
    commands: &[
        "enable",
        "disable",
        "navigate",
        "reload",
        "captureScreenshot",
        "handleJavaScriptDialog",
    ],
    events: &[
        "loadEventFired",
        "domContentEventFired",
        "frameNavigated",
        "javascriptDialogOpening",
    ],
};

const RUNTIME: Domain = Domain {
    name: "Runtime",
    commands: &[
        "enable",
        "disable",
        "evaluate",
        "callFunctionOn",
        "releaseObject",
    ],
    events: &["consoleAPICalled", "exceptionThrown", "executionContextCreated"],
};

const NETWORK: Domain = Domain {
    name: "Network",
    commands: &[
        "enable",
        "disable",
        "setCacheDisabled",
        "getResponseBody",
        "setExtraHTTPHeaders",
    ],
    events: &[
        "requestWillBeSent",
        "responseReceived",
        "loadingFinished",
        "loadingFailed",
    ],
};

const DOM: Domain = Domain {
    name: "DOM",
    commands: &[
        "enable",
        "disable",
        "getDocument",
        "querySelector",
        "querySelectorAll",
        "getOuterHTML",
    ],
    events: &["documentUpdated", "setChildNodes"],
};

const INSPECTOR: Domain = Domain {
    name: "Inspector",
    commands: &["enable", "disable"],
    events: &["detached", "targetCrashed", "targetReloadedAfterCrash"],
};

const BROWSER: Domain = Domain {
    name: "Browser",
    commands: &["getVersion", "close"],
    events: &[],
};

const PRELOAD: Domain = Domain {
    name: "Preload",
    commands: &["enable", "disable"],
    events: &["ruleSetUpdated", "prefetchStatusUpdated"],
};

static V118: VersionCatalog = VersionCatalog {
    version: 118,
    domains: &[TARGET, PAGE, RUNTIME, NETWORK, DOM, BROWSER],
};

static V124: VersionCatalog = VersionCatalog {
    version: 124,
    domains: &[TARGET, PAGE, RUNTIME, NETWORK, DOM, BROWSER, INSPECTOR],
};

static V131: VersionCatalog = VersionCatalog {
    version: 131,
    domains: &[TARGET, PAGE, RUNTIME, NETWORK, DOM, BROWSER, INSPECTOR, PRELOAD],
};

static V136: VersionCatalog = VersionCatalog {
    version: 136,
    domains: &[TARGET, PAGE, RUNTIME, NETWORK, DOM, BROWSER, INSPECTOR, PRELOAD],
};
