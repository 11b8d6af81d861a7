//! Shader pass construction, keyword validation and variant lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ShaderError;
use crate::keyword::{KeywordDomain, KeywordState};
use crate::render_state::{BlendState, CullMode, DepthStencilState};

use super::reflection::ShaderVariant;

/// Descriptor for creating a [`ShaderPass`].
///
/// Every field is optional; unset fields take the engine defaults when the
/// pass is built, or can be filled from another descriptor with
/// [`apply_defaults`](Self::apply_defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderPassDescriptor {
    /// Free-form tags (`"RenderOrder" => "Opaque"`).
    pub tags: Option<BTreeMap<String, String>>,
    /// Blend state, default [`BlendState::opaque`].
    pub blend: Option<BlendState>,
    /// Depth/stencil state, default [`DepthStencilState::depth_only_less_equal`].
    pub depth_stencil: Option<DepthStencilState>,
    /// Face culling, default [`CullMode::Back`].
    pub cull_mode: Option<CullMode>,
    /// Depth clipping, default `true`.
    pub depth_clip: Option<bool>,
    /// Declared keywords, default empty.
    pub keywords: Option<KeywordDomain>,
}

impl ShaderPassDescriptor {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(BTreeMap::new)
            .insert(tag.into(), value.into());
        self
    }

    /// Set the blend state.
    pub fn with_blend(mut self, blend: BlendState) -> Self {
        self.blend = Some(blend);
        self
    }

    /// Set the depth/stencil state.
    pub fn with_depth_stencil(mut self, depth_stencil: DepthStencilState) -> Self {
        self.depth_stencil = Some(depth_stencil);
        self
    }

    /// Set the cull mode.
    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = Some(cull_mode);
        self
    }

    /// Enable or disable depth clipping.
    pub fn with_depth_clip(mut self, enabled: bool) -> Self {
        self.depth_clip = Some(enabled);
        self
    }

    /// Set the whole keyword domain.
    pub fn with_keywords(mut self, keywords: KeywordDomain) -> Self {
        self.keywords = Some(keywords);
        self
    }

    /// Declare one keyword (first option is the default).
    pub fn with_keyword<I, S>(mut self, keyword: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain = self.keywords.take().unwrap_or_default();
        self.keywords = Some(domain.with_keyword(keyword, options));
        self
    }

    /// Fill every unset field from `defaults`.
    pub fn apply_defaults(&mut self, defaults: &ShaderPassDescriptor) {
        fn fill<T: Clone>(current: &mut Option<T>, default: &Option<T>) {
            if current.is_none() {
                current.clone_from(default);
            }
        }

        fill(&mut self.tags, &defaults.tags);
        fill(&mut self.blend, &defaults.blend);
        fill(&mut self.depth_stencil, &defaults.depth_stencil);
        fill(&mut self.cull_mode, &defaults.cull_mode);
        fill(&mut self.depth_clip, &defaults.depth_clip);
        fill(&mut self.keywords, &defaults.keywords);
    }
}

/// A named group of shader variants sharing fixed-function state.
///
/// The variant map is keyed by fully validated keyword states: every key
/// holds exactly the declared keywords, each with a legal option.
///
/// # Example
///
/// ```
/// use lumen_core::keyword::KeywordState;
/// use lumen_core::shader::{ShaderPass, ShaderPassDescriptor, ShaderVariant};
///
/// let low = KeywordState::new().with_key("QUALITY", "LOW");
/// let high = KeywordState::new().with_key("QUALITY", "HIGH");
/// let pass = ShaderPass::new(
///     "Forward",
///     ShaderPassDescriptor::new().with_keyword("QUALITY", ["LOW", "HIGH"]),
///     [ShaderVariant::new(low.clone()), ShaderVariant::new(high)],
/// )
/// .unwrap();
///
/// let variant = pass.get_variant(None).unwrap();
/// assert_eq!(variant.keywords(), &low);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "SerializedShaderPass", try_from = "SerializedShaderPass")]
pub struct ShaderPass {
    name: String,
    tags: BTreeMap<String, String>,
    blend: BlendState,
    depth_stencil: DepthStencilState,
    cull_mode: CullMode,
    depth_clip: bool,
    keywords: KeywordDomain,
    variants: BTreeMap<KeywordState, Arc<ShaderVariant>>,
}

impl ShaderPass {
    /// Build a pass from a descriptor and its compiled variants.
    ///
    /// Fails if a keyword declares no options, if a variant's keyword state is
    /// not already validated against the domain, or if two variants share a
    /// keyword state.
    pub fn new<I>(
        name: impl Into<String>,
        descriptor: ShaderPassDescriptor,
        variants: I,
    ) -> Result<Self, ShaderError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<ShaderVariant>>,
    {
        let name = name.into();
        let keywords = descriptor.keywords.unwrap_or_default();

        if let Some((keyword, _)) = keywords.iter().find(|(_, options)| options.is_empty()) {
            return Err(ShaderError::EmptyKeywordOptions(keyword.to_string()));
        }

        let mut pass = Self {
            name,
            tags: descriptor.tags.unwrap_or_default(),
            blend: descriptor.blend.unwrap_or_default(),
            depth_stencil: descriptor.depth_stencil.unwrap_or_default(),
            cull_mode: descriptor.cull_mode.unwrap_or_default(),
            depth_clip: descriptor.depth_clip.unwrap_or(true),
            keywords,
            variants: BTreeMap::new(),
        };

        for variant in variants {
            pass.insert_variant(variant.into())?;
        }

        log::debug!(
            "Created shader pass '{}' with {} variant(s) over {} keyword(s)",
            pass.name,
            pass.variants.len(),
            pass.keywords.len()
        );

        Ok(pass)
    }

    fn insert_variant(&mut self, variant: Arc<ShaderVariant>) -> Result<(), ShaderError> {
        let keywords = variant.keywords().clone();
        if self.validate_keywords(&keywords) != keywords {
            return Err(ShaderError::UnvalidatedVariant {
                pass: self.name.clone(),
                keywords,
            });
        }
        if self.variants.contains_key(&keywords) {
            return Err(ShaderError::DuplicateVariant {
                pass: self.name.clone(),
                keywords,
            });
        }
        self.variants.insert(keywords, variant);
        Ok(())
    }

    /// Map a requested keyword state onto the declared domain.
    ///
    /// Each declared keyword keeps the requested option when it is legal and
    /// falls back to its default otherwise. Undeclared keywords are dropped.
    pub fn validate_keywords(&self, requested: &KeywordState) -> KeywordState {
        self.keywords
            .iter()
            .filter_map(|(keyword, options)| {
                let default = options.first()?;
                let option = requested
                    .get(keyword)
                    .filter(|option| options.iter().any(|o| o == option))
                    .unwrap_or(default.as_str());
                Some((keyword, option))
            })
            .collect()
    }

    /// Resolve the variant for `keywords` (the default state when `None`).
    pub fn get_variant(
        &self,
        keywords: Option<&KeywordState>,
    ) -> Result<&Arc<ShaderVariant>, ShaderError> {
        let validated = self.validate_keywords(keywords.unwrap_or(&KeywordState::empty()));
        match self.variants.get(&validated) {
            Some(variant) => Ok(variant),
            None => Err(ShaderError::VariantNotFound {
                pass: self.name.clone(),
                keywords: validated,
            }),
        }
    }

    /// Non-failing form of [`get_variant`](Self::get_variant).
    pub fn try_get_variant(&self, keywords: Option<&KeywordState>) -> Option<&Arc<ShaderVariant>> {
        let validated = self.validate_keywords(keywords.unwrap_or(&KeywordState::empty()));
        self.variants.get(&validated)
    }

    /// Check whether `tag` is present, optionally with an exact value.
    pub fn has_tag(&self, tag: &str, value: Option<&str>) -> bool {
        match self.tags.get(tag) {
            Some(actual) => value.is_none_or(|v| v == actual),
            None => false,
        }
    }

    /// Pass name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pass tags.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Blend state.
    pub fn blend(&self) -> &BlendState {
        &self.blend
    }

    /// Depth/stencil state.
    pub fn depth_stencil(&self) -> &DepthStencilState {
        &self.depth_stencil
    }

    /// Face culling mode.
    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    /// Whether depth clipping is enabled.
    pub fn depth_clip(&self) -> bool {
        self.depth_clip
    }

    /// Declared keyword domain.
    pub fn keywords(&self) -> &KeywordDomain {
        &self.keywords
    }

    /// Iterate `(keyword state, variant)` entries in keyword-state order.
    pub fn variants(&self) -> impl Iterator<Item = (&KeywordState, &Arc<ShaderVariant>)> {
        self.variants.iter()
    }

    /// Number of compiled variants.
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}

/// Flat serialized form of a [`ShaderPass`].
///
/// Keyword names and their option lists are stored as parallel arrays; the
/// variant map is rebuilt from each variant's own keyword state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedShaderPass {
    pub name: String,
    pub tags: BTreeMap<String, String>,
    pub blend: BlendState,
    pub depth_stencil: DepthStencilState,
    pub cull_mode: CullMode,
    pub depth_clip: bool,
    pub keyword_names: Vec<String>,
    pub keyword_options: Vec<Vec<String>>,
    pub variants: Vec<Arc<ShaderVariant>>,
}

impl From<ShaderPass> for SerializedShaderPass {
    fn from(pass: ShaderPass) -> Self {
        let (keyword_names, keyword_options) = pass
            .keywords
            .iter()
            .map(|(keyword, options)| (keyword.to_string(), options.to_vec()))
            .unzip();

        Self {
            name: pass.name,
            tags: pass.tags,
            blend: pass.blend,
            depth_stencil: pass.depth_stencil,
            cull_mode: pass.cull_mode,
            depth_clip: pass.depth_clip,
            keyword_names,
            keyword_options,
            variants: pass.variants.into_values().collect(),
        }
    }
}

impl TryFrom<SerializedShaderPass> for ShaderPass {
    type Error = ShaderError;

    fn try_from(serialized: SerializedShaderPass) -> Result<Self, Self::Error> {
        if serialized.keyword_names.len() != serialized.keyword_options.len() {
            return Err(ShaderError::Deserialize(format!(
                "pass '{}' has {} keyword names but {} option lists",
                serialized.name,
                serialized.keyword_names.len(),
                serialized.keyword_options.len()
            )));
        }

        let keywords: KeywordDomain = serialized
            .keyword_names
            .into_iter()
            .zip(serialized.keyword_options)
            .collect();

        let descriptor = ShaderPassDescriptor {
            tags: Some(serialized.tags),
            blend: Some(serialized.blend),
            depth_stencil: Some(serialized.depth_stencil),
            cull_mode: Some(serialized.cull_mode),
            depth_clip: Some(serialized.depth_clip),
            keywords: Some(keywords),
        };

        ShaderPass::new(serialized.name, descriptor, serialized.variants)
    }
}
