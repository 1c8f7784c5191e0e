use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the sentinel that expands to every supported datatype
pub const ALL_SENTINEL: &str = "all";

/// Datatypes that can be extracted from a simulator run.
///
/// The declaration order is the canonical priority order used when
/// ordering an execution plan: summary before rft before grid before the rest.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Summary,
    Rft,
    Grid,
    Satfunc,
    Pvt,
    Vfp,
    Gruptree,
    Wellcompletiondata,
    Tran,
    Equil,
    Compdat,
    Faults,
    Fipreports,
    Wcon,
    Wellconnstatus,
}

impl Datatype {
    /// Every datatype, in priority order
    pub const ALL: [Datatype; 15] = [
        Datatype::Summary,
        Datatype::Rft,
        Datatype::Grid,
        Datatype::Satfunc,
        Datatype::Pvt,
        Datatype::Vfp,
        Datatype::Gruptree,
        Datatype::Wellcompletiondata,
        Datatype::Tran,
        Datatype::Equil,
        Datatype::Compdat,
        Datatype::Faults,
        Datatype::Fipreports,
        Datatype::Wcon,
        Datatype::Wellconnstatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Summary => "summary",
            Datatype::Rft => "rft",
            Datatype::Grid => "grid",
            Datatype::Satfunc => "satfunc",
            Datatype::Pvt => "pvt",
            Datatype::Vfp => "vfp",
            Datatype::Gruptree => "gruptree",
            Datatype::Wellcompletiondata => "wellcompletiondata",
            Datatype::Tran => "tran",
            Datatype::Equil => "equil",
            Datatype::Compdat => "compdat",
            Datatype::Faults => "faults",
            Datatype::Fipreports => "fipreports",
            Datatype::Wcon => "wcon",
            Datatype::Wellconnstatus => "wellconnstatus",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Datatype::ALL
            .iter()
            .copied()
            .find(|datatype| datatype.as_str() == s)
            .ok_or_else(|| format!("unknown datatype '{}'", s))
    }
}

/// A datatype as requested by the user, before the `all` sentinel is expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatatypeRequest {
    All,
    Named(Datatype),
}

impl fmt::Display for DatatypeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatatypeRequest::All => write!(f, "{}", ALL_SENTINEL),
            DatatypeRequest::Named(datatype) => write!(f, "{}", datatype),
        }
    }
}

impl From<Datatype> for DatatypeRequest {
    fn from(datatype: Datatype) -> Self {
        DatatypeRequest::Named(datatype)
    }
}

/// Which datatypes one datafile should be extracted with.
///
/// `own_datatypes` set means the file uses exactly that list and ignores the
/// global one, even when the list is empty (explicit opt-out).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatypeSelection {
    pub own_datatypes: Option<Vec<DatatypeRequest>>,
    pub inherits_global: bool,
}

impl DatatypeSelection {
    pub fn inherit() -> Self {
        Self {
            own_datatypes: None,
            inherits_global: true,
        }
    }

    pub fn own(requests: Vec<DatatypeRequest>) -> Self {
        Self {
            own_datatypes: Some(requests),
            inherits_global: false,
        }
    }
}

impl Default for DatatypeSelection {
    fn default() -> Self {
        Self::inherit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_round_trip_through_str() {
        for datatype in Datatype::ALL {
            assert_eq!(datatype.as_str().parse::<Datatype>().unwrap(), datatype);
        }
    }

    #[test]
    fn test_unknown_datatype() {
        let err = "foo".parse::<Datatype>().unwrap_err();
        assert!(err.contains("foo"));
        assert!(ALL_SENTINEL.parse::<Datatype>().is_err());
    }

    #[test]
    fn test_priority_order() {
        assert!(Datatype::Summary < Datatype::Rft);
        assert!(Datatype::Rft < Datatype::Grid);
        assert!(Datatype::Grid < Datatype::Satfunc);

        let mut sorted = Datatype::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Datatype::ALL.to_vec());
    }

    #[test]
    fn test_yaml_serialization() {
        let yaml = serde_yaml::to_string(&Datatype::Wellcompletiondata).unwrap();
        assert_eq!(yaml.trim(), "wellcompletiondata");

        let deserialized: Datatype = serde_yaml::from_str("tran").unwrap();
        assert_eq!(deserialized, Datatype::Tran);
    }

    #[test]
    fn test_selection_constructors() {
        let inherit = DatatypeSelection::inherit();
        assert!(inherit.inherits_global);
        assert!(inherit.own_datatypes.is_none());

        let opt_out = DatatypeSelection::own(Vec::new());
        assert!(!opt_out.inherits_global);
        assert_eq!(opt_out.own_datatypes, Some(Vec::new()));
    }

    #[test]
    fn test_request_display() {
        assert_eq!(DatatypeRequest::All.to_string(), "all");
        assert_eq!(DatatypeRequest::Named(Datatype::Pvt).to_string(), "pvt");
    }
}
