// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Page data and its section blocks.
//!
//! The CMS returns each section tagged with its GraphQL `__typename`. Raw
//! sections decode into [`RawBlock`] and are mapped into the public [`Block`]
//! sum type; sections of unknown or malformed kinds are skipped.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::client::CmsClient;
use crate::error::CmsError;

const DESIGN_FIELDS: &str = "design { paddingTop paddingBottom background containerWidth align hideOn variant textTheme backgroundImage { url width height } }";

fn page_by_slug_query() -> String {
    format!(
        r#"
query PageBySlug($slug: String!, $preview: Boolean = false) {{
  pageCollection(limit: 1, where: {{ slug: $slug }}, preview: $preview) {{
    items {{
      title
      slug
      theme
      audienceHints
      seo {{ metaTitle metaDescription canonicalUrl ogImage {{ url width height }} }}
      sectionsCollection(limit: 20) {{
        items {{
          __typename
          ... on Hero {{ eyebrow headline subhead primaryCta {{ label href style }} secondaryCta {{ label href style }} media {{ url width height }} {d} }}
          ... on FeatureGrid {{ heading intro columns {d} itemsCollection(limit: 12) {{ items {{ title body icon {{ url width height }} link {{ label href style }} }} }} }}
          ... on Testimonial {{ quote authorName authorTitle authorLogo {{ url width height }} link {{ label href style }} {d} }}
          ... on CtaBanner {{ headline bodyText: body cta {{ label href style }} {d} }}
          ... on LogoWall {{ heading logosCollection(limit: 24) {{ items {{ url width height }} }} {d} }}
          ... on ContentSplit {{ layout image {{ url width height }} heading bodyRich: body {{ json }} cta {{ label href style }} {d} }}
          ... on Faq {{ heading itemsCollection(limit: 20) {{ items {{ question answer {{ json }} }} }} {d} }}
          ... on RichTextBlock {{ heading bodyRich: body {{ json }} {d} }}
          ... on ProductDataCallout {{ heading dataSource locationOrQuery metricKeys format fallbackText {d} }}
          ... on BlockAiChat {{ heading {d} }}
        }}
      }}
    }}
  }}
}}"#,
        d = DESIGN_FIELDS
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaStyle {
    Primary,
    Secondary,
    Link,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cta {
    pub label: String,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CtaStyle>,
}

/// Presentation hints passed through untouched, except the background
/// image which is normalized to an [`Asset`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignControls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub background_image: Option<Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_on: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub icon: Option<Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Cta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: Option<Value>,
}

/// Live metrics attached to a product data callout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalloutData {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
    /// Text to show instead of the data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

pub const DEFAULT_CALLOUT_FALLBACK: &str = "Data unavailable at this time.";

/// One page section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename", rename_all = "camelCase")]
pub enum Block {
    #[serde(rename_all = "camelCase")]
    Hero {
        #[serde(skip_serializing_if = "Option::is_none")]
        eyebrow: Option<String>,
        headline: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        subhead: Option<String>,
        #[serde(rename = "primaryCTA", skip_serializing_if = "Option::is_none")]
        primary_cta: Option<Cta>,
        #[serde(rename = "secondaryCTA", skip_serializing_if = "Option::is_none")]
        secondary_cta: Option<Cta>,
        media: Option<Asset>,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
    },
    #[serde(rename_all = "camelCase")]
    FeatureGrid {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        intro: Option<String>,
        items: Vec<FeatureItem>,
        #[serde(skip_serializing_if = "Option::is_none")]
        columns: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
    },
    #[serde(rename_all = "camelCase")]
    Testimonial {
        quote: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        author_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        author_title: Option<String>,
        author_logo: Option<Asset>,
        #[serde(skip_serializing_if = "Option::is_none")]
        link: Option<Cta>,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
    },
    #[serde(rename_all = "camelCase")]
    CtaBanner {
        headline: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<String>,
        cta: Cta,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
    },
    #[serde(rename_all = "camelCase")]
    LogoWall {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        logos: Vec<Asset>,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
    },
    #[serde(rename_all = "camelCase")]
    ContentSplit {
        #[serde(skip_serializing_if = "Option::is_none")]
        layout: Option<String>,
        image: Option<Asset>,
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cta: Option<Cta>,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
    },
    #[serde(rename_all = "camelCase")]
    Faq {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        items: Vec<FaqItem>,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
    },
    #[serde(rename_all = "camelCase")]
    RichTextBlock {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        body: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
    },
    #[serde(rename_all = "camelCase")]
    ProductDataCallout {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        data_source: String,
        location_or_query: String,
        metric_keys: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        format: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fallback_text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
        /// Filled in when the page is served
        #[serde(skip_serializing_if = "Option::is_none")]
        resolved: Option<CalloutData>,
    },
    #[serde(rename_all = "camelCase")]
    AiChat {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        design: Option<DesignControls>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub meta_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    pub og_image: Option<Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience_hints: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
    pub sections: Vec<Block>,
}

// Raw GraphQL shapes

#[derive(Debug, Deserialize)]
struct RawAsset {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl RawAsset {
    fn into_asset(self) -> Option<Asset> {
        let url = self.url.filter(|u| !u.is_empty())?;
        Some(Asset {
            id: url.clone(),
            url,
            width: self.width,
            height: self.height,
        })
    }
}

fn asset(raw: Option<RawAsset>) -> Option<Asset> {
    raw.and_then(RawAsset::into_asset)
}

#[derive(Debug, Deserialize)]
struct RawCta {
    label: String,
    href: String,
    style: Option<String>,
}

impl From<RawCta> for Cta {
    fn from(raw: RawCta) -> Self {
        let style = match raw.style.as_deref() {
            Some("primary") => Some(CtaStyle::Primary),
            Some("secondary") => Some(CtaStyle::Secondary),
            Some("link") => Some(CtaStyle::Link),
            _ => None,
        };
        Cta {
            label: raw.label,
            href: raw.href,
            style,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDesign {
    padding_top: Option<String>,
    padding_bottom: Option<String>,
    background: Option<String>,
    background_image: Option<RawAsset>,
    container_width: Option<String>,
    align: Option<String>,
    hide_on: Option<Vec<String>>,
    variant: Option<String>,
    text_theme: Option<String>,
}

impl From<RawDesign> for DesignControls {
    fn from(raw: RawDesign) -> Self {
        DesignControls {
            padding_top: raw.padding_top,
            padding_bottom: raw.padding_bottom,
            background: raw.background,
            background_image: asset(raw.background_image),
            container_width: raw.container_width,
            align: raw.align,
            hide_on: raw.hide_on,
            variant: raw.variant,
            text_theme: raw.text_theme,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCollection<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RichJson {
    json: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeatureItem {
    title: String,
    body: Option<String>,
    icon: Option<RawAsset>,
    link: Option<RawCta>,
}

#[derive(Debug, Deserialize)]
struct RawFaqItem {
    question: String,
    answer: Option<RichJson>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum RawBlock {
    #[serde(rename_all = "camelCase")]
    Hero {
        eyebrow: Option<String>,
        headline: String,
        subhead: Option<String>,
        primary_cta: Option<RawCta>,
        secondary_cta: Option<RawCta>,
        media: Option<RawAsset>,
        design: Option<RawDesign>,
    },
    #[serde(rename_all = "camelCase")]
    FeatureGrid {
        heading: Option<String>,
        intro: Option<String>,
        columns: Option<u8>,
        items_collection: Option<RawCollection<RawFeatureItem>>,
        design: Option<RawDesign>,
    },
    #[serde(rename_all = "camelCase")]
    Testimonial {
        quote: String,
        author_name: Option<String>,
        author_title: Option<String>,
        author_logo: Option<RawAsset>,
        link: Option<RawCta>,
        design: Option<RawDesign>,
    },
    #[serde(rename_all = "camelCase")]
    CtaBanner {
        headline: String,
        body_text: Option<String>,
        body: Option<String>,
        cta: RawCta,
        design: Option<RawDesign>,
    },
    #[serde(rename_all = "camelCase")]
    LogoWall {
        heading: Option<String>,
        logos_collection: Option<RawCollection<RawAsset>>,
        design: Option<RawDesign>,
    },
    #[serde(rename_all = "camelCase")]
    ContentSplit {
        layout: Option<String>,
        image: Option<RawAsset>,
        heading: Option<String>,
        body_rich: Option<RichJson>,
        cta: Option<RawCta>,
        design: Option<RawDesign>,
    },
    #[serde(rename_all = "camelCase")]
    Faq {
        heading: Option<String>,
        items_collection: Option<RawCollection<RawFaqItem>>,
        design: Option<RawDesign>,
    },
    #[serde(rename_all = "camelCase")]
    RichTextBlock {
        heading: Option<String>,
        body_rich: Option<RichJson>,
        design: Option<RawDesign>,
    },
    #[serde(rename_all = "camelCase")]
    ProductDataCallout {
        heading: Option<String>,
        data_source: String,
        location_or_query: String,
        metric_keys: Option<Vec<String>>,
        format: Option<String>,
        fallback_text: Option<String>,
        design: Option<RawDesign>,
    },
    BlockAiChat {
        heading: Option<String>,
        design: Option<RawDesign>,
    },
    #[serde(other)]
    Unknown,
}

fn design(raw: Option<RawDesign>) -> Option<DesignControls> {
    raw.map(DesignControls::from)
}

impl RawBlock {
    fn into_block(self) -> Option<Block> {
        let block = match self {
            RawBlock::Hero {
                eyebrow,
                headline,
                subhead,
                primary_cta,
                secondary_cta,
                media,
                design: d,
            } => Block::Hero {
                eyebrow,
                headline,
                subhead,
                primary_cta: primary_cta.map(Cta::from),
                secondary_cta: secondary_cta.map(Cta::from),
                media: asset(media),
                design: design(d),
            },
            RawBlock::FeatureGrid {
                heading,
                intro,
                columns,
                items_collection,
                design: d,
            } => Block::FeatureGrid {
                heading,
                intro,
                items: items_collection
                    .map(|c| c.items)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|fi| FeatureItem {
                        title: fi.title,
                        body: fi.body,
                        icon: asset(fi.icon),
                        link: fi.link.map(Cta::from),
                    })
                    .collect(),
                columns,
                design: design(d),
            },
            RawBlock::Testimonial {
                quote,
                author_name,
                author_title,
                author_logo,
                link,
                design: d,
            } => Block::Testimonial {
                quote,
                author_name,
                author_title,
                author_logo: asset(author_logo),
                link: link.map(Cta::from),
                design: design(d),
            },
            RawBlock::CtaBanner {
                headline,
                body_text,
                body,
                cta,
                design: d,
            } => Block::CtaBanner {
                headline,
                body: body_text.or(body),
                cta: cta.into(),
                design: design(d),
            },
            RawBlock::LogoWall {
                heading,
                logos_collection,
                design: d,
            } => Block::LogoWall {
                heading,
                logos: logos_collection
                    .map(|c| c.items)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(RawAsset::into_asset)
                    .collect(),
                design: design(d),
            },
            RawBlock::ContentSplit {
                layout,
                image,
                heading,
                body_rich,
                cta,
                design: d,
            } => Block::ContentSplit {
                layout,
                image: asset(image),
                heading,
                body: body_rich.and_then(|b| b.json),
                cta: cta.map(Cta::from),
                design: design(d),
            },
            RawBlock::Faq {
                heading,
                items_collection,
                design: d,
            } => Block::Faq {
                heading,
                items: items_collection
                    .map(|c| c.items)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|q| FaqItem {
                        question: q.question,
                        answer: q.answer.and_then(|a| a.json),
                    })
                    .collect(),
                design: design(d),
            },
            RawBlock::RichTextBlock {
                heading,
                body_rich,
                design: d,
            } => Block::RichTextBlock {
                heading,
                body: body_rich.and_then(|b| b.json),
                design: design(d),
            },
            RawBlock::ProductDataCallout {
                heading,
                data_source,
                location_or_query,
                metric_keys,
                format,
                fallback_text,
                design: d,
            } => Block::ProductDataCallout {
                heading,
                data_source,
                location_or_query,
                metric_keys: metric_keys.unwrap_or_default(),
                format,
                fallback_text,
                design: design(d),
                resolved: None,
            },
            RawBlock::BlockAiChat { heading, design: d } => Block::AiChat {
                heading,
                design: design(d),
            },
            RawBlock::Unknown => return None,
        };
        Some(block)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeo {
    meta_title: String,
    meta_description: Option<String>,
    canonical_url: Option<String>,
    og_image: Option<RawAsset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    title: String,
    slug: String,
    theme: Option<String>,
    audience_hints: Option<String>,
    seo: Option<RawSeo>,
    sections_collection: Option<RawCollection<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageData {
    page_collection: Option<RawCollection<RawPage>>,
}

/// Decode a list of raw sections, skipping the ones that do not map
pub fn map_sections(raw: Vec<Value>) -> Vec<Block> {
    raw.into_iter()
        .filter_map(|section| {
            let typename = section
                .get("__typename")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            match serde_json::from_value::<RawBlock>(section) {
                Ok(raw) => raw.into_block(),
                Err(e) => {
                    warn!(typename = %typename, error = %e, "Skipping malformed section");
                    None
                }
            }
        })
        .collect()
}

fn map_page(raw: RawPage) -> Page {
    let theme = match raw.theme.as_deref() {
        Some("light") => Some(Theme::Light),
        Some("dark") => Some(Theme::Dark),
        Some("auto") => Some(Theme::Auto),
        _ => None,
    };
    Page {
        title: raw.title,
        slug: raw.slug,
        theme,
        audience_hints: raw.audience_hints,
        seo: raw.seo.map(|s| Seo {
            meta_title: s.meta_title,
            meta_description: s.meta_description,
            og_image: asset(s.og_image),
            canonical_url: s.canonical_url,
        }),
        sections: map_sections(
            raw.sections_collection
                .map(|c| c.items)
                .unwrap_or_default(),
        ),
    }
}

/// Fetch one page by slug; `None` when no page has that slug
pub async fn page_by_slug(
    client: &CmsClient,
    slug: &str,
    preview: bool,
) -> Result<Option<Page>, CmsError> {
    let data: PageData = client
        .query(
            &page_by_slug_query(),
            json!({ "slug": slug, "preview": preview }),
            preview,
        )
        .await?;
    Ok(data
        .page_collection
        .and_then(|c| c.items.into_iter().next())
        .map(map_page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::client::tests::test_config;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sections_map_per_variant() {
        let sections = map_sections(vec![
            json!({
                "__typename": "Hero",
                "headline": "Ship faster",
                "primaryCta": {"label": "Start", "href": "/start", "style": "primary"},
                "secondaryCta": {"label": "Docs", "href": "/docs", "style": "fancy"},
                "media": {"url": "https://img/x.png", "width": 10, "height": 5}
            }),
            json!({"__typename": "CtaBanner", "headline": "Go", "bodyText": "Now", "cta": {"label": "Buy", "href": "/buy"}}),
            json!({"__typename": "SomethingNew", "x": 1}),
            json!({"__typename": "Testimonial"}),
            json!({"__typename": "BlockAiChat", "heading": "Ask us"}),
        ]);

        assert_eq!(sections.len(), 3);
        match &sections[0] {
            Block::Hero {
                primary_cta,
                secondary_cta,
                media,
                ..
            } => {
                assert_eq!(primary_cta.as_ref().unwrap().style, Some(CtaStyle::Primary));
                assert_eq!(secondary_cta.as_ref().unwrap().style, None);
                assert_eq!(media.as_ref().unwrap().id, "https://img/x.png");
            }
            other => panic!("unexpected block {other:?}"),
        }
        assert!(matches!(&sections[1], Block::CtaBanner { body: Some(b), .. } if b == "Now"));
        assert!(matches!(&sections[2], Block::AiChat { .. }));
    }

    #[test]
    fn test_block_serializes_with_public_typename() {
        let block = Block::AiChat {
            heading: Some("Ask".into()),
            design: None,
        };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"__typename": "aiChat", "heading": "Ask"})
        );

        let callout = map_sections(vec![json!({
            "__typename": "ProductDataCallout",
            "dataSource": "worldbank",
            "locationOrQuery": "US:NY.GDP.MKTP.CD"
        })]);
        let value = serde_json::to_value(&callout[0]).unwrap();
        assert_eq!(value["__typename"], "productDataCallout");
        assert_eq!(value["metricKeys"], json!([]));
    }

    #[tokio::test]
    async fn test_page_by_slug() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {"slug": "pricing"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
                "pageCollection": {"items": [{
                    "title": "Pricing",
                    "slug": "pricing",
                    "theme": "purple",
                    "seo": {"metaTitle": "Pricing", "ogImage": null},
                    "sectionsCollection": {"items": [
                        {"__typename": "RichTextBlock", "heading": "Plans", "bodyRich": {"json": {"value": "x"}}}
                    ]}
                }]}
            }})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {"slug": "missing"}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"pageCollection": {"items": []}}})),
            )
            .mount(&server)
            .await;

        let client = CmsClient::new(reqwest::Client::new(), test_config(&server));
        let page = page_by_slug(&client, "pricing", false).await.unwrap().unwrap();
        assert_eq!(page.title, "Pricing");
        assert_eq!(page.theme, None);
        assert_eq!(page.sections.len(), 1);

        assert!(page_by_slug(&client, "missing", false).await.unwrap().is_none());
    }
}
