//! # Network Documents
//!
//! The document model consumed by the analysis engine: one consensus, the
//! votes it was computed from, and the fetch bookkeeping for both.
//!
//! Documents are immutable once built. Builders validate the invariants the
//! engine relies on (hexadecimal fingerprints, unique status entries, named
//! votes), so downstream code never re-checks them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DocumentError;

/// Milliseconds since the Unix epoch.
pub type UnixMillis = u64;

/// Flag assigned to relays that are currently reachable.
pub const FLAG_RUNNING: &str = "Running";

/// Flag assigned to relays operated by a directory authority.
pub const FLAG_AUTHORITY: &str = "Authority";

/// A relay identity: the uppercase hexadecimal digest of its identity key.
///
/// Fingerprints are normalized to uppercase at construction, so two
/// documents spelling the same relay differently still compare equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Validates and normalizes a hexadecimal fingerprint.
    pub fn new(hex: impl Into<String>) -> Result<Self, DocumentError> {
        let hex = hex.into();
        if hex.is_empty() {
            return Err(DocumentError::EmptyFingerprint);
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DocumentError::InvalidFingerprint { fingerprint: hex });
        }
        Ok(Self(hex.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Fingerprint> for String {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}

/// One relay as listed by a consensus or vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// Identity of the relay this entry describes.
    pub fingerprint: Fingerprint,
    /// Nickname the publishing document lists for the relay.
    pub nickname: String,
    /// Flags the publishing document assigns to the relay.
    pub flags: BTreeSet<String>,
    /// Bandwidth measurement, present only when a scanner reported one.
    pub measured_bandwidth: Option<u64>,
    /// Platform version advertised by the relay, when known.
    pub version: Option<String>,
}

impl StatusEntry {
    pub fn new(fingerprint: Fingerprint, nickname: impl Into<String>) -> Self {
        Self {
            fingerprint,
            nickname: nickname.into(),
            flags: BTreeSet::new(),
            measured_bandwidth: None,
            version: None,
        }
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    pub fn with_measured_bandwidth(mut self, bandwidth: u64) -> Self {
        self.measured_bandwidth = Some(bandwidth);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_running(&self) -> bool {
        self.has_flag(FLAG_RUNNING)
    }
}

/// The aggregated consensus document produced by the authorities.
///
/// Fields are private: the engine treats a consensus as a read-only snapshot,
/// and the builder is the only way to produce one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusDocument {
    valid_after: UnixMillis,
    consensus_method: u32,
    known_flags: BTreeSet<String>,
    client_versions: Vec<String>,
    server_versions: Vec<String>,
    params: BTreeMap<String, i64>,
    status_entries: BTreeMap<Fingerprint, StatusEntry>,
    voting_authorities: Option<BTreeSet<String>>,
    signing_authorities: Option<BTreeSet<String>>,
}

impl ConsensusDocument {
    pub fn builder(valid_after: UnixMillis, consensus_method: u32) -> ConsensusDocumentBuilder {
        ConsensusDocumentBuilder {
            valid_after,
            consensus_method,
            known_flags: BTreeSet::new(),
            client_versions: Vec::new(),
            server_versions: Vec::new(),
            params: BTreeMap::new(),
            status_entries: Vec::new(),
            voting_authorities: None,
            signing_authorities: None,
        }
    }

    /// Moment this consensus became valid.
    pub fn valid_after(&self) -> UnixMillis {
        self.valid_after
    }

    /// Consensus method the authorities agreed on.
    pub fn consensus_method(&self) -> u32 {
        self.consensus_method
    }

    /// Every flag the consensus may assign.
    pub fn known_flags(&self) -> &BTreeSet<String> {
        &self.known_flags
    }

    /// Recommended client versions, in the order the consensus lists them.
    pub fn client_versions(&self) -> &[String] {
        &self.client_versions
    }

    /// Recommended server versions, in the order the consensus lists them.
    pub fn server_versions(&self) -> &[String] {
        &self.server_versions
    }

    /// Network-wide consensus parameters.
    pub fn params(&self) -> &BTreeMap<String, i64> {
        &self.params
    }

    /// All relay entries, keyed and ordered by fingerprint.
    pub fn status_entries(&self) -> &BTreeMap<Fingerprint, StatusEntry> {
        &self.status_entries
    }

    pub fn status_entry(&self, fingerprint: &Fingerprint) -> Option<&StatusEntry> {
        self.status_entries.get(fingerprint)
    }

    pub fn contains_status_entry(&self, fingerprint: &Fingerprint) -> bool {
        self.status_entries.contains_key(fingerprint)
    }

    /// Authorities whose votes the consensus says it was computed from,
    /// when that roster survived parsing.
    pub fn voting_authorities(&self) -> Option<&BTreeSet<String>> {
        self.voting_authorities.as_ref()
    }

    /// Authorities whose signatures the consensus carries, when that roster
    /// survived parsing.
    pub fn signing_authorities(&self) -> Option<&BTreeSet<String>> {
        self.signing_authorities.as_ref()
    }
}

/// Assembles a [`ConsensusDocument`], rejecting duplicate status entries.
#[derive(Clone, Debug)]
pub struct ConsensusDocumentBuilder {
    valid_after: UnixMillis,
    consensus_method: u32,
    known_flags: BTreeSet<String>,
    client_versions: Vec<String>,
    server_versions: Vec<String>,
    params: BTreeMap<String, i64>,
    status_entries: Vec<StatusEntry>,
    voting_authorities: Option<BTreeSet<String>>,
    signing_authorities: Option<BTreeSet<String>>,
}

impl ConsensusDocumentBuilder {
    pub fn known_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_flags.extend(flags.into_iter().map(Into::into));
        self
    }

    pub fn client_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.client_versions
            .extend(versions.into_iter().map(Into::into));
        self
    }

    pub fn server_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.server_versions
            .extend(versions.into_iter().map(Into::into));
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: i64) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn status_entry(mut self, entry: StatusEntry) -> Self {
        self.status_entries.push(entry);
        self
    }

    pub fn status_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = StatusEntry>,
    {
        self.status_entries.extend(entries);
        self
    }

    pub fn voting_authorities<I, S>(mut self, nicknames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.voting_authorities
            .get_or_insert_with(BTreeSet::new)
            .extend(nicknames.into_iter().map(Into::into));
        self
    }

    pub fn signing_authorities<I, S>(mut self, nicknames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signing_authorities
            .get_or_insert_with(BTreeSet::new)
            .extend(nicknames.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<ConsensusDocument, DocumentError> {
        Ok(ConsensusDocument {
            valid_after: self.valid_after,
            consensus_method: self.consensus_method,
            known_flags: self.known_flags,
            client_versions: self.client_versions,
            server_versions: self.server_versions,
            params: self.params,
            status_entries: key_by_fingerprint(self.status_entries)?,
            voting_authorities: self.voting_authorities,
            signing_authorities: self.signing_authorities,
        })
    }
}

/// One authority's vote on the state of the network.
///
/// Optional fields were genuinely absent from the vote; an authority that
/// publishes no version opinion is not the same as one that publishes an
/// empty list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDocument {
    nickname: String,
    known_flags: BTreeSet<String>,
    consensus_methods: BTreeSet<u32>,
    client_versions: Option<Vec<String>>,
    server_versions: Option<Vec<String>>,
    params: Option<BTreeMap<String, i64>>,
    dir_key_expires: UnixMillis,
    status_entries: BTreeMap<Fingerprint, StatusEntry>,
}

impl VoteDocument {
    pub fn builder(
        nickname: impl Into<String>,
        dir_key_expires: UnixMillis,
    ) -> VoteDocumentBuilder {
        VoteDocumentBuilder {
            nickname: nickname.into(),
            known_flags: BTreeSet::new(),
            consensus_methods: BTreeSet::new(),
            client_versions: None,
            server_versions: None,
            params: None,
            dir_key_expires,
            status_entries: Vec::new(),
        }
    }

    /// Nickname of the authority that cast this vote.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Every flag this authority may assign.
    pub fn known_flags(&self) -> &BTreeSet<String> {
        &self.known_flags
    }

    /// Consensus methods this authority supports.
    pub fn consensus_methods(&self) -> &BTreeSet<u32> {
        &self.consensus_methods
    }

    /// Client versions this authority recommends, if it voted on versions.
    pub fn client_versions(&self) -> Option<&[String]> {
        self.client_versions.as_deref()
    }

    /// Server versions this authority recommends, if it voted on versions.
    pub fn server_versions(&self) -> Option<&[String]> {
        self.server_versions.as_deref()
    }

    /// Consensus parameters this authority votes for, if it voted on params.
    pub fn params(&self) -> Option<&BTreeMap<String, i64>> {
        self.params.as_ref()
    }

    /// Expiry of the signing certificate this vote was signed with.
    pub fn dir_key_expires(&self) -> UnixMillis {
        self.dir_key_expires
    }

    /// All relay entries, keyed and ordered by fingerprint.
    pub fn status_entries(&self) -> &BTreeMap<Fingerprint, StatusEntry> {
        &self.status_entries
    }

    pub fn status_entry(&self, fingerprint: &Fingerprint) -> Option<&StatusEntry> {
        self.status_entries.get(fingerprint)
    }

    pub fn contains_status_entry(&self, fingerprint: &Fingerprint) -> bool {
        self.status_entries.contains_key(fingerprint)
    }
}

/// Assembles a [`VoteDocument`], rejecting unnamed votes and duplicate
/// status entries.
#[derive(Clone, Debug)]
pub struct VoteDocumentBuilder {
    nickname: String,
    known_flags: BTreeSet<String>,
    consensus_methods: BTreeSet<u32>,
    client_versions: Option<Vec<String>>,
    server_versions: Option<Vec<String>>,
    params: Option<BTreeMap<String, i64>>,
    dir_key_expires: UnixMillis,
    status_entries: Vec<StatusEntry>,
}

impl VoteDocumentBuilder {
    pub fn known_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_flags.extend(flags.into_iter().map(Into::into));
        self
    }

    pub fn consensus_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        self.consensus_methods.extend(methods);
        self
    }

    pub fn client_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.client_versions
            .get_or_insert_with(Vec::new)
            .extend(versions.into_iter().map(Into::into));
        self
    }

    pub fn server_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.server_versions
            .get_or_insert_with(Vec::new)
            .extend(versions.into_iter().map(Into::into));
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: i64) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }

    pub fn status_entry(mut self, entry: StatusEntry) -> Self {
        self.status_entries.push(entry);
        self
    }

    pub fn status_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = StatusEntry>,
    {
        self.status_entries.extend(entries);
        self
    }

    pub fn build(self) -> Result<VoteDocument, DocumentError> {
        if self.nickname.is_empty() {
            return Err(DocumentError::EmptyNickname);
        }
        Ok(VoteDocument {
            nickname: self.nickname,
            known_flags: self.known_flags,
            consensus_methods: self.consensus_methods,
            client_versions: self.client_versions,
            server_versions: self.server_versions,
            params: self.params,
            dir_key_expires: self.dir_key_expires,
            status_entries: key_by_fingerprint(self.status_entries)?,
        })
    }
}

fn key_by_fingerprint(
    entries: Vec<StatusEntry>,
) -> Result<BTreeMap<Fingerprint, StatusEntry>, DocumentError> {
    let mut keyed = BTreeMap::new();
    for entry in entries {
        let fingerprint = entry.fingerprint.clone();
        if keyed.insert(fingerprint.clone(), entry).is_some() {
            return Err(DocumentError::DuplicateFingerprint {
                fingerprint: fingerprint.to_string(),
            });
        }
    }
    Ok(keyed)
}

/// A parsed document of either kind, tagged by what it is.
///
/// Ingestion matches on the variant instead of probing documents for their
/// type, so a batch may mix consensuses and votes freely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkDocument {
    Consensus(ConsensusDocument),
    Vote(VoteDocument),
}

impl NetworkDocument {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Consensus(_) => "consensus",
            Self::Vote(_) => "vote",
        }
    }
}

/// How a single document request against one authority ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOutcome {
    /// The authority answered within the deadline.
    Delivered,
    /// The request exceeded its deadline.
    TimedOut,
    /// The request failed outright.
    Failed,
}

/// Fetch bookkeeping for one authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRecord {
    /// Nickname of the authority the request went to.
    pub authority: String,
    /// How the request ended.
    pub outcome: FetchOutcome,
}

impl FetchRecord {
    pub fn new(authority: impl Into<String>, outcome: FetchOutcome) -> Self {
        Self {
            authority: authority.into(),
            outcome,
        }
    }
}

/// Everything one analysis run consumes: the documents that arrived and the
/// per-authority fetch outcomes for the requests that produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBatch {
    pub documents: Vec<NetworkDocument>,
    pub fetches: Vec<FetchRecord>,
}

impl DocumentBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch with no fetch bookkeeping, for callers that already hold
    /// parsed documents.
    pub fn from_documents(documents: Vec<NetworkDocument>) -> Self {
        Self {
            documents,
            fetches: Vec::new(),
        }
    }

    pub fn push_document(&mut self, document: NetworkDocument) {
        self.documents.push(document);
    }

    pub fn record_fetch(&mut self, authority: impl Into<String>, outcome: FetchOutcome) {
        self.fetches.push(FetchRecord::new(authority, outcome));
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.fetches.is_empty()
    }
}
