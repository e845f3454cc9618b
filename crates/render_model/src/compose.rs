//! Letter composition: profile + content into a renderable tree

use crate::{
    layout, Align, Border, Color, ContentNode, Edges, ImageSource, Justify, PageFormat, Position,
    Result, TextAlign, TextSpan, TextStyle,
};
use doc_model::{CompanyProfile, FontFamily, LetterContent, LetterLayout};

/// Page padding on every side, in millimetres
pub const PAGE_PADDING_MM: f32 = 20.0;

/// Height of a page-end guide, in CSS pixels
const GUIDE_HEIGHT: f32 = 16.0;

/// Resolved styling shared by every part of the letter
struct Theme {
    primary: Color,
    accent: Color,
    family: FontFamily,
    logo: Option<ImageSource>,
    page_padding: f32,
}

impl Theme {
    fn new(profile: &CompanyProfile, format: &PageFormat) -> Result<Self> {
        let logo = match profile.logo() {
            Some(source) => Some(ImageSource::try_from(source?)?),
            None => None,
        };
        Ok(Self {
            primary: Color::from_hex(&profile.primary_color)?,
            accent: Color::from_hex(&profile.accent_color)?,
            family: profile.font_family,
            logo,
            page_padding: format.mm_to_px(PAGE_PADDING_MM),
        })
    }

    fn text(&self, size: f32, color: Color) -> TextStyle {
        TextStyle::sized(size).with_color(color).with_family(self.family)
    }

    fn logo(&self, height: f32) -> Option<ContentNode> {
        self.logo
            .clone()
            .map(|source| ContentNode::image(source).styled(|s| s.height = Some(height)))
    }
}

fn text(value: impl Into<String>, style: TextStyle) -> ContentNode {
    ContentNode::text(value, style)
}

fn column_aligned(align: Align) -> ContentNode {
    ContentNode::column().styled(|s| s.align = align)
}

/// Build the letter as a renderable tree
///
/// The root is exactly one page wide with a one-page minimum height. When
/// the letter runs over several pages, screen-only guides mark each page end.
pub fn compose_letter(
    profile: &CompanyProfile,
    content: &LetterContent,
    format: &PageFormat,
) -> Result<ContentNode> {
    format.validate()?;
    let theme = Theme::new(profile, format)?;

    let header = match profile.layout {
        LetterLayout::Executive => executive_header(profile, &theme),
        LetterLayout::Creative => creative_header(profile, &theme),
        LetterLayout::Bold => bold_header(profile, &theme),
        LetterLayout::Minimal => minimal_header(profile, &theme),
        LetterLayout::Classic => classic_header(profile, &theme),
        LetterLayout::Modern => modern_header(profile, &theme),
    };

    let mut root = ContentNode::column()
        .styled(|s| {
            s.width = Some(format.raster_width_px as f32);
            s.min_height = Some(format.min_content_height_px());
            s.padding = Edges::all(theme.page_padding);
            s.background = Some(Color::WHITE);
        })
        .child(header)
        .child(letter_body(content, &theme)?);

    if profile.show_footer {
        root = root.child(footer(profile, &theme));
    }
    match profile.layout {
        LetterLayout::Modern => root = root.child(gradient_bar(&theme)),
        LetterLayout::Bold => root = root.child(corner_circle()),
        _ => {}
    }

    let pages = format.pages_for_height(layout(&root, format.raster_width_px as f32)?.natural_height());
    if pages > 1 {
        tracing::debug!(pages, "adding page guides");
        root = root.children((1..pages).map(|page| page_guide(page, format)));
    }
    Ok(root)
}

/// Dashed marker at the end of `page` (1-based), shown only in the editor
fn page_guide(page: usize, format: &PageFormat) -> ContentNode {
    let top = page as f32 * format.page_height_px() - GUIDE_HEIGHT;
    ContentNode::row()
        .styled(|s| {
            s.screen_only = true;
            s.height = Some(GUIDE_HEIGHT);
            s.justify = Justify::End;
            s.align = Align::End;
            s.padding = Edges::symmetric(0.0, 8.0);
            s.border_bottom = Some(Border::dashed(2.0, Color::SLATE_300.with_opacity(0.5)));
            s.position = Position::Overlay {
                top: Some(top),
                right: Some(0.0),
                bottom: None,
                left: Some(0.0),
            };
        })
        .child(
            text(
                format!("Page {} End", page),
                TextStyle::sized(10.0).with_color(Color::SLATE_400.with_opacity(0.5)).with_line_height(1.4),
            )
            .styled(|s| {
                s.background = Some(Color::WHITE.with_opacity(0.8));
                s.padding = Edges::symmetric(0.0, 4.0);
            }),
        )
}

fn gradient_bar(theme: &Theme) -> ContentNode {
    let band = |color: Color| ContentNode::column().styled(move |s| {
        s.grow = true;
        s.background = Some(color);
    });
    ContentNode::row()
        .styled(|s| {
            s.height = Some(8.0);
            s.position = Position::Overlay {
                top: None,
                right: Some(0.0),
                bottom: Some(0.0),
                left: Some(0.0),
            };
        })
        .child(band(theme.primary))
        .child(band(theme.accent))
}

fn corner_circle() -> ContentNode {
    ContentNode::column().styled(|s| {
        s.width = Some(128.0);
        s.height = Some(128.0);
        s.corner_radius = 64.0;
        s.background = Some(Color::BLACK.with_opacity(0.05));
        s.position = Position::Overlay {
            top: None,
            right: Some(-64.0),
            bottom: Some(-64.0),
            left: None,
        };
    })
}

fn modern_header(profile: &CompanyProfile, theme: &Theme) -> ContentNode {
    let mut brand = column_aligned(Align::Start);
    if let Some(logo) = theme.logo(64.0) {
        brand = brand.child(logo.styled(|s| s.margin = Edges::bottom(20.0)));
    }
    brand = brand.child(text(
        &profile.name,
        theme.text(30.0, theme.primary).bold().with_line_height(1.0),
    ));

    let mut details = column_aligned(Align::End);
    if profile.show_header_address {
        details = details.child(text(
            profile.address_lines().join("\n"),
            theme
                .text(14.0, Color::SLATE_600)
                .with_line_height(1.625)
                .aligned(TextAlign::Right),
        ));
    }
    if profile.show_header_contact {
        let contact = theme.text(12.0, Color::SLATE_600).aligned(TextAlign::Right);
        details = details.child(
            column_aligned(Align::End)
                .styled(|s| {
                    s.margin = Edges::top(12.0);
                    s.gap = 2.0;
                })
                .child(text(&profile.website, contact.clone().bold().with_color(theme.accent)))
                .child(text(&profile.email, contact.clone()))
                .child(text(&profile.phone, contact)),
        );
    }

    ContentNode::row()
        .styled(|s| {
            s.justify = Justify::SpaceBetween;
            s.align = Align::Start;
            s.padding = Edges::bottom(32.0);
            s.margin = Edges::bottom(48.0);
            s.border_bottom = Some(Border::solid(4.0, theme.primary));
        })
        .child(brand)
        .child(details)
}

fn classic_header(profile: &CompanyProfile, theme: &Theme) -> ContentNode {
    let serif = |size: f32, color: Color| TextStyle::sized(size).with_color(color).with_family(FontFamily::Serif);

    let logo = theme.logo(96.0).unwrap_or_else(|| {
        ContentNode::column()
            .styled(|s| {
                s.width = Some(96.0);
                s.height = Some(96.0);
                s.padding = Edges::symmetric(39.0, 0.0);
                s.background = Some(Color::SLATE_50);
                s.outline = Some(Border::solid(1.0, Color::SLATE_200));
                s.corner_radius = 8.0;
            })
            .child(text(
                "Logo Area",
                TextStyle {
                    italic: true,
                    ..serif(12.0, Color::SLATE_300).with_line_height(1.5).aligned(TextAlign::Center)
                },
            ))
    });

    let mut identity = column_aligned(Align::End).styled(|s| s.grow = true).child(
        text(&profile.name, serif(36.0, theme.primary).bold().with_line_height(1.1).aligned(TextAlign::Right))
            .styled(|s| s.margin = Edges::bottom(12.0)),
    );
    if profile.show_header_address {
        identity = identity.child(text(
            profile.address_lines().join("\n"),
            serif(14.0, Color::SLATE_600).with_line_height(1.625).aligned(TextAlign::Right),
        ));
    }
    if profile.show_header_contact {
        identity = identity.child(
            ContentNode::row()
                .styled(|s| {
                    s.gap = 16.0;
                    s.margin = Edges::top(16.0);
                })
                .child(text(&profile.email, serif(14.0, theme.accent)))
                .child(text("|", serif(14.0, Color::SLATE_300)))
                .child(text(&profile.phone, serif(14.0, Color::SLATE_600))),
        );
    }

    ContentNode::row()
        .styled(|s| {
            s.align = Align::Center;
            s.gap = 32.0;
            s.padding = Edges::bottom(32.0);
            s.margin = Edges::bottom(56.0);
            s.border_bottom = Some(Border::solid(1.0, Color::SLATE_200));
        })
        .child(logo)
        .child(identity)
}

fn minimal_header(profile: &CompanyProfile, theme: &Theme) -> ContentNode {
    let mut header = column_aligned(Align::Center).styled(|s| s.margin = Edges::bottom(64.0));
    if let Some(logo) = theme.logo(56.0) {
        header = header.child(logo.styled(|s| s.margin = Edges::bottom(24.0)));
    }
    header = header.child(
        text(
            &profile.name,
            theme
                .text(24.0, theme.primary)
                .bold()
                .uppercase()
                .with_letter_spacing(0.2)
                .aligned(TextAlign::Center),
        )
        .styled(|s| s.margin = Edges::bottom(12.0)),
    );
    if profile.show_header_contact {
        let small = theme.text(10.0, Color::SLATE_500).uppercase().with_letter_spacing(0.1);
        let dot = ContentNode::column().styled(|s| {
            s.width = Some(4.0);
            s.height = Some(4.0);
            s.corner_radius = 2.0;
            s.background = Some(Color::SLATE_300);
        });
        header = header.child(
            ContentNode::row()
                .styled(|s| {
                    s.gap = 16.0;
                    s.align = Align::Center;
                })
                .child(text(&profile.website, small.clone()))
                .child(dot)
                .child(text(&profile.email, small)),
        );
    }
    header
}

fn executive_header(profile: &CompanyProfile, theme: &Theme) -> ContentNode {
    let pad = theme.page_padding;

    let mut brand = column_aligned(Align::Start);
    if let Some(logo) = theme.logo(64.0) {
        brand = brand.child(logo.styled(|s| s.margin = Edges::bottom(16.0)));
    }
    brand = brand.child(text(&profile.name, theme.text(36.0, Color::WHITE).bold().with_line_height(1.1)));

    let mut band = ContentNode::row()
        .styled(|s| {
            s.justify = Justify::SpaceBetween;
            s.align = Align::Center;
            s.background = Some(theme.primary);
            s.padding = Edges::symmetric(40.0, pad);
            s.margin = Edges {
                top: -pad,
                right: -pad,
                bottom: 32.0,
                left: -pad,
            };
        })
        .child(brand);
    if profile.show_header_contact {
        let contact = theme
            .text(14.0, Color::WHITE.with_opacity(0.9))
            .aligned(TextAlign::Right);
        band = band.child(
            column_aligned(Align::End)
                .styled(|s| s.gap = 4.0)
                .child(text(&profile.email, contact.clone()))
                .child(text(&profile.phone, contact.clone()))
                .child(text(&profile.website, contact)),
        );
    }

    let mut header = ContentNode::column().styled(|s| s.margin = Edges::bottom(48.0)).child(band);
    if profile.show_header_address {
        header = header.child(
            text(
                profile.address_inline(", "),
                theme
                    .text(14.0, Color::SLATE_500)
                    .uppercase()
                    .with_letter_spacing(0.025)
                    .aligned(TextAlign::Right),
            )
            .styled(|s| {
                s.padding = Edges::bottom(16.0);
                s.border_bottom = Some(Border::solid(1.0, Color::SLATE_200));
            }),
        );
    }
    header
}

fn creative_header(profile: &CompanyProfile, theme: &Theme) -> ContentNode {
    let mark = match theme.logo.clone() {
        Some(source) => ContentNode::column()
            .styled(|s| {
                s.width = Some(80.0);
                s.height = Some(80.0);
                s.padding = Edges::all(8.0);
                s.corner_radius = 16.0;
                s.background = Some(Color::WHITE);
                s.outline = Some(Border::solid(1.0, Color::SLATE_100));
            })
            .child(ContentNode::image(source).styled(|s| s.height = Some(64.0))),
        None => ContentNode::column()
            .styled(|s| {
                s.width = Some(80.0);
                s.height = Some(80.0);
                s.padding = Edges::symmetric(22.0, 0.0);
                s.corner_radius = 16.0;
                s.background = Some(Color::SLATE_100);
            })
            .child(text(
                profile.initial().map(String::from).unwrap_or_default(),
                theme.text(24.0, Color::SLATE_400).bold().aligned(TextAlign::Center),
            )),
    };

    let mut identity = ContentNode::column().child(
        text(&profile.name, theme.text(36.0, theme.primary).bold().with_line_height(1.0))
            .styled(|s| s.margin = Edges::bottom(4.0)),
    );
    if profile.show_header_address {
        if let Some(first) = profile.address_lines().first() {
            identity = identity.child(text(*first, theme.text(16.0, Color::SLATE_500)));
        }
    }

    let mut contact = ContentNode::row().styled(|s| {
        s.gap = 24.0;
        s.margin = Edges::top(32.0);
        s.padding = Edges::bottom(24.0);
        s.border_bottom = Some(Border::solid(2.0, theme.accent));
    });
    if profile.show_header_contact {
        let small = theme
            .text(12.0, Color::SLATE_400)
            .bold()
            .uppercase()
            .with_letter_spacing(0.1);
        contact = contact
            .child(text(&profile.website, small.clone()))
            .child(text(&profile.email, small));
    }

    let glow = ContentNode::column().styled(|s| {
        s.width = Some(128.0);
        s.height = Some(128.0);
        s.corner_radius = 64.0;
        s.background = Some(theme.accent.with_opacity(0.2));
        s.position = Position::Overlay {
            top: Some(-64.0),
            right: Some(-64.0),
            bottom: None,
            left: None,
        };
    });

    ContentNode::column()
        .styled(|s| s.margin = Edges::bottom(64.0))
        .child(glow)
        .child(
            ContentNode::row()
                .styled(|s| {
                    s.align = Align::Center;
                    s.gap = 24.0;
                })
                .child(mark)
                .child(identity),
        )
        .child(contact)
}

fn bold_header(profile: &CompanyProfile, theme: &Theme) -> ContentNode {
    let mut brand = column_aligned(Align::Start);
    if let Some(logo) = theme.logo(80.0) {
        brand = brand.child(logo.styled(|s| s.margin = Edges::bottom(24.0)));
    }
    let stacked_name = profile.name.split_whitespace().collect::<Vec<_>>().join("\n");
    brand = brand.child(text(
        stacked_name,
        theme
            .text(60.0, theme.primary)
            .bold()
            .uppercase()
            .with_line_height(0.9)
            .with_letter_spacing(-0.05),
    ));

    let mut details = column_aligned(Align::End).styled(|s| s.gap = 16.0);
    if profile.show_header_address {
        details = details.child(
            text(
                profile.address_lines().join("\n"),
                theme
                    .text(14.0, Color::SLATE_900)
                    .bold()
                    .with_line_height(1.25)
                    .aligned(TextAlign::Right),
            )
            .styled(|s| s.max_width = Some(200.0)),
        );
    }
    if profile.show_header_contact {
        let mono = theme.text(12.0, Color::SLATE_900).aligned(TextAlign::Right);
        details = details.child(
            column_aligned(Align::End)
                .styled(|s| {
                    s.padding = Edges::all(12.0);
                    s.corner_radius = 8.0;
                    s.background = Some(Color::SLATE_100);
                })
                .child(text(&profile.email, mono.clone()))
                .child(text(&profile.phone, mono.clone()))
                .child(text(&profile.website, mono)),
        );
    }

    ContentNode::row()
        .styled(|s| {
            s.justify = Justify::SpaceBetween;
            s.align = Align::End;
            s.padding = Edges::bottom(32.0);
            s.margin = Edges::bottom(64.0);
            s.border_bottom = Some(Border::solid(4.0, theme.primary));
        })
        .child(brand)
        .child(details)
}

/// Date, recipient, subject and body
fn letter_body(content: &LetterContent, theme: &Theme) -> Result<ContentNode> {
    let recipient = ContentNode::column()
        .child(
            text(&content.recipient_name, theme.text(18.0, Color::SLATE_900).bold())
                .styled(|s| s.margin = Edges::bottom(6.0)),
        )
        .child(text(
            &content.recipient_address,
            theme.text(16.0, Color::SLATE_600).with_line_height(1.625),
        ));

    let mut main = ContentNode::column()
        .styled(|s| s.grow = true)
        .child(
            ContentNode::column()
                .styled(|s| {
                    s.gap = 32.0;
                    s.margin = Edges::bottom(40.0);
                })
                .child(text(
                    &content.date,
                    theme
                        .text(14.0, Color::SLATE_500)
                        .bold()
                        .with_letter_spacing(0.025),
                ))
                .child(recipient),
        );

    if !content.subject.trim().is_empty() {
        main = main.child(
            column_aligned(Align::Start)
                .styled(|s| s.margin = Edges::bottom(40.0))
                .child(
                    text(
                        format!("RE: {}", content.subject.trim()),
                        theme.text(18.0, theme.primary).bold(),
                    )
                    .styled(|s| {
                        s.padding = Edges::bottom(2.0);
                        s.border_bottom = Some(Border::solid(2.0, theme.accent));
                    }),
                ),
        );
    }

    // 11pt body text on a 2rem line
    let body_size = 11.0 * 96.0 / 72.0;
    let body_style = theme.text(body_size, Color::SLATE_700).with_line_height(32.0 / body_size);
    let paragraphs = content.paragraphs()?;
    main = main.children(paragraphs.iter().map(|para| {
        let spans = para
            .runs
            .iter()
            .map(|run| {
                let mut span = TextSpan::from(run);
                if span.bold {
                    span.color = Some(Color::SLATE_800);
                }
                span
            })
            .collect();
        ContentNode::rich_text(spans, body_style.clone()).styled(|s| s.margin = Edges::bottom(16.0))
    }));

    Ok(main)
}

fn footer(profile: &CompanyProfile, theme: &Theme) -> ContentNode {
    let divider = profile
        .show_footer_divider
        .then(|| Border::solid(1.0, Color::SLATE_200));

    match profile.layout {
        LetterLayout::Executive => column_aligned(Align::Center)
            .styled(|s| {
                s.padding = Edges::top(24.0);
                s.border_top = divider;
            })
            .child(
                text(
                    &profile.name,
                    theme
                        .text(10.0, Color::SLATE_400)
                        .bold()
                        .uppercase()
                        .with_letter_spacing(0.1)
                        .aligned(TextAlign::Center),
                )
                .styled(|s| s.margin = Edges::bottom(8.0)),
            )
            .child(text(
                profile.address_inline(" \u{2022} "),
                theme.text(12.0, Color::SLATE_500).aligned(TextAlign::Center),
            )),
        LetterLayout::Creative => ContentNode::row()
            .styled(|s| {
                s.justify = Justify::SpaceBetween;
                s.align = Align::Center;
                s.padding = Edges::top(32.0);
                s.border_top = Some(Border::dashed(2.0, Color::SLATE_200));
            })
            .child(text(&profile.name, theme.text(12.0, Color::SLATE_900).bold()))
            .child(
                ContentNode::row()
                    .styled(|s| {
                        s.gap = 16.0;
                        s.padding = Edges::symmetric(8.0, 16.0);
                        s.corner_radius = 16.0;
                        s.background = Some(Color::SLATE_50);
                    })
                    .child(text(&profile.phone, theme.text(10.0, Color::SLATE_500)))
                    .child(text(&profile.email, theme.text(10.0, Color::SLATE_500))),
            ),
        _ => {
            let small = |color: Color| theme.text(10.0, color).uppercase().with_letter_spacing(0.05);
            ContentNode::row()
                .styled(|s| {
                    s.justify = Justify::SpaceBetween;
                    s.padding = Edges::top(32.0);
                    s.border_top = divider;
                })
                .child(text(&profile.name, small(Color::SLATE_500).bold()))
                .child(text(&profile.website, small(Color::SLATE_400)))
        }
    }
}
