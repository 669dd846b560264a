use rust_xlsxwriter::*;

use crate::error::Result;
use crate::models::test_result::TestResult;

pub struct ExportService;

impl ExportService {
    /// Generate a styled XLSX workbook from the stored test results.
    pub fn generate_results_xlsx(results: &[TestResult]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Results")?;

        // ── Color palette ──
        let primary_color = Color::RGB(0x1E293B); // Slate 800
        let header_bg = Color::RGB(0x0F172A); // Slate 900
        let header_text = Color::White;
        let alt_row_1 = Color::RGB(0xF8FAFC); // Slate 50
        let alt_row_2 = Color::White;
        let border_color = Color::RGB(0xE2E8F0); // Slate 200

        // Score colors by earned/attainable ratio
        let score_high = Color::RGB(0x10B981); // Emerald (70%+)
        let score_mid = Color::RGB(0xF59E0B); // Amber (40-69%)
        let score_low = Color::RGB(0xEF4444); // Red (<40%)

        // ── Column definitions ──
        let columns = [
            ("№", 8.0),
            ("Name", 28.0),
            ("Department", 20.0),
            ("Test", 32.0),
            ("Score", 12.0),
            ("Out of", 12.0),
            ("Auto-submitted", 34.0),
            ("Submitted at", 22.0),
        ];

        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        // ── Title row ──
        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(0, 40)?;
        worksheet.merge_range(0, 0, 0, (columns.len() - 1) as u16, "Test Results", &title_format)?;

        // ── Subtitle row ──
        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(1, 22)?;
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
        let subtitle_text = format!("Exported: {}  •  Results: {}", now, results.len());
        worksheet.merge_range(1, 0, 1, (columns.len() - 1) as u16, &subtitle_text, &subtitle_format)?;

        // ── Header row ──
        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let header_row = 2;
        worksheet.set_row_height(header_row, 30)?;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        // ── Data rows ──
        let data_start_row = 3;
        for (idx, result) in results.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };

            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);

            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);

            worksheet.set_row_height(row, 22)?;

            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;

            let name = format!("{} {}", result.first_name, result.last_name);
            let name_fmt = base_fmt.clone().set_bold();
            worksheet.write_string_with_format(row, 1, &name, &name_fmt)?;

            worksheet.write_string_with_format(row, 2, &result.department, &base_fmt)?;
            worksheet.write_string_with_format(row, 3, &result.test_title, &base_fmt)?;

            let ratio = if result.total_points > 0 {
                result.score as f64 / result.total_points as f64
            } else {
                0.0
            };
            let s_color = if ratio >= 0.7 {
                score_high
            } else if ratio >= 0.4 {
                score_mid
            } else {
                score_low
            };
            let score_fmt = Format::new()
                .set_font_size(11)
                .set_bold()
                .set_font_color(s_color)
                .set_background_color(bg)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            worksheet.write_number_with_format(row, 4, result.score as f64, &score_fmt)?;
            worksheet.write_number_with_format(row, 5, result.total_points as f64, &center_fmt)?;

            let reason = result.auto_submit_reason.as_deref().unwrap_or("—");
            worksheet.write_string_with_format(row, 6, reason, &base_fmt)?;

            let submitted = result.submitted_at.format("%Y-%m-%d %H:%M").to_string();
            worksheet.write_string_with_format(row, 7, &submitted, &center_fmt)?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
