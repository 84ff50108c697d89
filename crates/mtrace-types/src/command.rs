use serde::{Deserialize, Serialize};

/// Bit flags carried by a tracepoint's configuration entry. Disjoint powers
/// of two so a single byte can describe what a tracepoint records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFlags(pub u8);

impl TraceFlags {
    pub const CALL_COUNT: TraceFlags = TraceFlags(0b01);
    pub const WALL_TIME: TraceFlags = TraceFlags(0b10);

    pub fn contains(&self, other: TraceFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for TraceFlags {
    type Output = TraceFlags;

    fn bitor(self, rhs: TraceFlags) -> TraceFlags {
        TraceFlags(self.0 | rhs.0)
    }
}

/// What a `trace` command asks to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceOption {
    /// Both call counts and wall time. Also the implicit default when the
    /// command omits the option keyword.
    All,
    CallCount,
    WallTime,
}

impl TraceOption {
    pub fn flags(&self) -> TraceFlags {
        match self {
            TraceOption::All => TraceFlags::CALL_COUNT | TraceFlags::WALL_TIME,
            TraceOption::CallCount => TraceFlags::CALL_COUNT,
            TraceOption::WallTime => TraceFlags::WALL_TIME,
        }
    }
}

/// What a `trace`/`untrace` command applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceTarget {
    /// The tracer's own internals.
    Tracer,
    /// The fixed `psi-finders` extension-point target.
    PsiFinders,
    /// Every known class (`*`).
    All,
    /// `C*`: classes whose name starts with the given prefix.
    WildcardClass(String),
    /// `C#*` or `C#M*`. An empty method name is the "all methods" sentinel,
    /// distinguished from `WildcardClass` only by the `#` in the source.
    WildcardMethod { class_name: String, method_name: String },
    /// An exact class, optionally narrowed to a method and to specific
    /// parameter indexes.
    ///
    /// `param_indexes` is three-valued: `None` means match by name only,
    /// any signature; `Some(vec![])` means no explicit indexes were supplied
    /// (overload resolution deferred to the instrumentation collaborator);
    /// `Some(list)` selects positional parameter indexes to disambiguate
    /// overloads.
    Method {
        class_name: String,
        method_name: Option<String>,
        param_indexes: Option<Vec<u32>>,
    },
}

/// A concrete method reference handed to the trace-configuration store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRef {
    pub class_name: String,
    pub method_name: String,
    pub param_indexes: Option<Vec<u32>>,
}

/// A parsed session command. Instances are transient: constructed per parse,
/// discarded after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clear,
    Reset,
    Trace {
        enable: bool,
        /// `None` is parsed as implicit [`TraceOption::All`].
        option: Option<TraceOption>,
        target: TraceTarget,
    },
}
