use std::path::PathBuf;

use crate::Hash;

/// error type for repository operations
///
/// informational outcomes ("Already up-to-date", "Fast-forward", ...) are
/// returned as Ok values by the operations, never as variants here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fatal: not a vers repository (or any of the parent directories)")]
    NotInRepo(PathBuf),

    #[error("this operation must be run in a work tree")]
    BareDisallowed,

    #[error("fatal: pathspec '{0}' did not match any files")]
    NoMatch(String),

    #[error("unsupported")]
    Unsupported,

    #[error("error: {0} is a directory - add files inside instead")]
    PathIsDirectory(String),

    #[error("not removing {0} recursively without -r")]
    RecursiveRequired(String),

    #[error("local changes would be lost\n{}", .0.join("\n"))]
    LocalChangesWouldBeLost(Vec<String>),

    #[error("error: the following files have changes:\n{}", .0.join("\n"))]
    FilesHaveChanges(Vec<String>),

    #[error("{}\ncannot commit because you have unmerged files",
        .0.iter().map(|p| format!("U {p}")).collect::<Vec<_>>().join("\n"))]
    UnresolvedConflicts(Vec<String>),

    #[error("# On {0}\nnothing to commit, working directory clean")]
    NothingToCommit(String),

    #[error("error: pathspec {0} did not match any file(s) known to vers")]
    PathspecUnknown(String),

    #[error("fatal: ambiguous argument {0}: unknown revision")]
    UnknownRevision(String),

    #[error("fatal: {0}: not a valid object name")]
    InvalidObjectName(String),

    #[error("fatal: Not a valid object name: '{0}'.")]
    BranchPointMissing(String),

    #[error("fatal: A branch named '{0}' already exists")]
    BranchAlreadyExists(String),

    #[error("fatal: cannot lock the ref {0}")]
    InvalidRefName(String),

    #[error("error: trying to write non-commit object {hash} to ref {name}")]
    NotACommit { name: String, hash: Hash },

    #[error("fatal: reference is not a tree: {0}")]
    ReferenceNotTree(String),

    #[error("{0}: expected commit type")]
    ExpectedCommit(String),

    #[error("fatal: {0} does not appear to be a vers repository")]
    RemoteMissing(String),

    #[error("fatal: repository {0} does not exist")]
    RemoteRepoMissing(String),

    #[error("fatal: couldn't find remote ref {0}")]
    RemoteRefMissing(String),

    #[error("failed to push some refs to {0}")]
    NonFastForward(String),

    #[error("refusing to update checked out branch {0}")]
    CheckedOutBranch(String),

    #[error("remote {0} already exists")]
    RemoteAlreadyExists(String),

    #[error("fatal: destination path {0} already exists and is not an empty directory")]
    TargetNotEmpty(PathBuf),

    #[error("error: {0}: cannot add to the index - missing --add option?")]
    AddOptionRequired(String),

    #[error("error: {0}: does not exist and --remove not passed")]
    RemoveOptionRequired(String),

    #[error("fatal: corrupt object {0}")]
    CorruptObject(Hash),

    #[error("fatal: tree nesting exceeds depth limit")]
    TreeDepthExceeded,

    #[error("invalid tree entry name: {0}")]
    InvalidEntryName(String),

    #[error("duplicate tree entry name: {0}")]
    DuplicateEntryName(String),

    #[error("malformed ref record: {0}")]
    MalformedRef(String),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("cbor deserialization error: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
