//! Model catalogue
//!
//! The pretrained chat models offered for on-demand serving. Any other model
//! OCID is accepted as well; the catalogue only provides display names and a
//! default.

/// Meta Llama 3.1 405B Instruct
pub const DEFAULT_MODEL_ID: &str =
    "ocid1.generativeaimodel.oc1.iad.amaaaaaask7dceya6pk3sxishpiexm2rb5sf4ytb5tsbz4to2g3g23smidaa";

pub mod model_ids {
    pub const META_LLAMA_3_1_405B_INSTRUCT: &str = super::DEFAULT_MODEL_ID;
    pub const META_LLAMA_3_1_70B_INSTRUCT: &str =
        "ocid1.generativeaimodel.oc1.iad.amaaaaaa23dgkeya6pk3sxishpiexm2rb5sf4ytb5tsbz4to2g3g23smidaa";
    pub const COHERE_COMMAND_R_PLUS: &str =
        "ocid1.generativeaimodel.oc1.iad.amaaaaaask7dceybpn7wl7kkisl4mfe7v5mgcq4juqlvfchcjp7nt5xxf2fka";
    pub const COHERE_COMMAND_R: &str =
        "ocid1.generativeaimodel.oc1.iad.amaaaaaask7dceyb4oegfzv6sk4l6xmf7v5mgcq4juqlvfchcjp7nt5xxf2fka";
}

/// A catalogued chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OciModel {
    #[default]
    MetaLlama405bInstruct,
    MetaLlama70bInstruct,
    CohereCommandRPlus,
    CohereCommandR,
}

impl OciModel {
    pub const ALL: [Self; 4] = [
        Self::MetaLlama405bInstruct,
        Self::MetaLlama70bInstruct,
        Self::CohereCommandRPlus,
        Self::CohereCommandR,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::MetaLlama405bInstruct => model_ids::META_LLAMA_3_1_405B_INSTRUCT,
            Self::MetaLlama70bInstruct => model_ids::META_LLAMA_3_1_70B_INSTRUCT,
            Self::CohereCommandRPlus => model_ids::COHERE_COMMAND_R_PLUS,
            Self::CohereCommandR => model_ids::COHERE_COMMAND_R,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::MetaLlama405bInstruct => "Meta Llama 3.1 405B Instruct",
            Self::MetaLlama70bInstruct => "Meta Llama 3.1 70B Instruct",
            Self::CohereCommandRPlus => "Cohere Command R+",
            Self::CohereCommandR => "Cohere Command R",
        }
    }

    /// Find the catalogue entry for a model OCID.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }
}

impl From<OciModel> for String {
    fn from(model: OciModel) -> Self {
        model.id().to_string()
    }
}

/// All catalogued model OCIDs, default first.
pub fn get_all_models() -> Vec<String> {
    OciModel::ALL.iter().map(|m| m.id().to_string()).collect()
}
