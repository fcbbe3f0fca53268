//! HTML builders shaped like the player site's pages.

use std::fmt::Write as _;

use crate::constants::Difficulty;
use crate::model::ChartType;

const IMG: &str = "https://maimaidx.jp/maimai-mobile/img";

fn page(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja"><head><meta charset="utf-8"><title>maimai DX NET</title></head>
<body><div class="main_wrapper t_c">
{content}
</div></body></html>"#
    )
}

/// One row of a score search page.
#[derive(Debug, Clone)]
pub struct RowFixture {
    title: String,
    chart_type: ChartType,
    difficulty: Difficulty,
    level: String,
    score: Option<(String, (u32, u32), Vec<String>)>,
}

impl RowFixture {
    pub fn new(title: &str, chart_type: ChartType, difficulty: Difficulty) -> Self {
        Self {
            title: title.to_string(),
            chart_type,
            difficulty,
            level: "13+".to_string(),
            score: None,
        }
    }

    pub fn level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    /// Adds a best score; `flags` are record icon keys (`app`, `fsdp`, `back`).
    pub fn scored(mut self, achievement: &str, deluxe: (u32, u32), flags: &[&str]) -> Self {
        self.score = Some((
            achievement.to_string(),
            deluxe,
            flags.iter().map(ToString::to_string).collect(),
        ));
        self
    }

    fn render(&self, index: usize) -> String {
        let difficulty = self.difficulty.page_name();
        let mut row = format!(
            r#"<div class="music_{difficulty}_score_back pointer w_450 m_15 p_3 f_0">
<img src="{IMG}/diff_{difficulty}.png" class="h_20 f_l">
<div class="music_lv_block f_r t_c f_14">{level}</div>
<div class="music_name_block t_l f_13 break">{title}</div>
"#,
            level = self.level,
            title = self.title,
        );
        if let Some((achievement, (value, max), flags)) = &self.score {
            let _ = write!(
                row,
                r#"<div class="music_score_block w_120 t_r f_l f_12">{achievement}</div>
<div class="music_score_block w_180 t_r f_l f_12">{value} / {max}</div>
"#
            );
            for flag in flags {
                let _ = writeln!(
                    row,
                    r#"<img src="{IMG}/music_icon_{flag}.png?ver=1.40" class="h_30 f_r">"#
                );
            }
        }
        let _ = write!(
            row,
            r#"<form action="https://maimaidx.jp/maimai-mobile/record/musicDetail/" method="get">
<input type="hidden" name="idx" value="{index},{title}"></form>
</div>"#,
            title = self.title,
        );

        let icon = match self.chart_type {
            ChartType::Dx => "dx",
            ChartType::Standard => "standard",
            ChartType::Unknown => return row,
        };
        format!(
            r#"<div class="w_450 m_15 p_r f_0">
<img src="{IMG}/music_{icon}.png" class="music_kind_icon">
{row}
</div>"#
        )
    }
}

/// A score search page: category headers, each followed by its rows.
pub fn music_list_page(categories: &[(&str, Vec<RowFixture>)]) -> String {
    let mut content = String::new();
    let mut index = 0;
    for (name, rows) in categories {
        let _ = writeln!(content, r#"<div class="screw_block m_15 f_15">{name}</div>"#);
        for row in rows {
            content.push_str(&row.render(index));
            content.push('\n');
            index += 1;
        }
    }
    page(&content)
}

/// A player profile page.
pub fn player_data_page(name: &str, rating: u32) -> String {
    page(&player_plate(name, rating))
}

/// A player profile page with the song counter grid of `difficulty`; cell
/// `n` in column-major order reads `n / 100`.
pub fn player_statistics_page(difficulty: Difficulty) -> String {
    let mut content = player_plate("ＰＬＡＹＥＲ", 15_000);
    let _ = writeln!(
        content,
        r#"<img src="{IMG}/diff_{}.png" class="h_20">"#,
        difficulty.page_name()
    );
    for row in 0..7 {
        for column in 0..3 {
            let _ = writeln!(
                content,
                r#"<div class="musiccount_block f_l"><img src="{IMG}/icon.png">{} / 100</div>"#,
                column * 7 + row
            );
        }
        content.push_str("<div class=\"clearfix\"></div>\n");
    }
    page(&content)
}

fn player_plate(name: &str, rating: u32) -> String {
    format!(
        r#"<div class="see_through_block m_15 m_t_0 p_10 p_r t_l f_0">
<img src="{IMG}/Icon/icon.png" class="w_112 f_l">
<div class="p_l_10 f_l">
  <div class="trophy_block trophy_Normal p_3 t_c f_0">
    <div class="trophy_inner_block f_13"><span>でらっくす</span></div></div>
  <div class="m_b_5"><div class="name_block f_l f_16">{name}</div></div>
  <div class="rating_block">{rating}</div>
  <img src="{IMG}/course/course_rank_05.png" class="h_35 f_l">
  <img src="{IMG}/class/class_rank_s_00.png" class="p_l_10 h_35 f_l">
  <div class="p_l_10 f_l f_14"><img src="{IMG}/icon_star.png" class="h_30 f_l">×321</div>
</div>
</div>
<div class="m_5 m_t_10 t_r f_12">maimaiDX total play count：1,042</div>"#
    )
}

/// A recent play page with two tracks.
pub fn recent_page() -> String {
    page(&format!(
        r#"<div class="p_10 t_l f_0 v_b">
  <div class="playlog_top_container p_r">
    <img src="{IMG}/diff_master.png" class="playlog_diff v_b">
    <div class="sub_title t_c f_r f_11">
      <span class="red f_b v_b">TRACK 04</span><span class="v_b">2024/03/05 21:07</span></div>
  </div>
  <div class="playlog_master_container">
    <div class="basic_block m_5 p_5 p_l_10 f_13 break">
      <div class="music_lv_block f_r t_c f_14">13+</div>
      Song A
    </div>
    <img src="{IMG}/music_dx.png" class="playlog_music_kind_icon">
    <img src="{IMG}/jacket/0a1b2c3d.png" class="music_img m_5 f_l">
    <div class="playlog_achievement_txt t_r">100.<span class="f_20">3456</span>%</div>
    <img src="{IMG}/playlog/sssplus.png?ver=1.40" class="playlog_scorerank">
    <div class="playlog_score_block p_5"><div class="white p_r_5 f_15 f_r">2,801 / 3,000</div></div>
    <div class="playlog_result_innerblock">
      <img src="{IMG}/playlog/fcplus.png?ver=1.40" class="h_35 m_5 f_l">
      <img src="{IMG}/playlog/sync.png?ver=1.40" class="h_35 m_5 f_l">
      <img src="{IMG}/playlog/fs_dummy.png?ver=1.40" class="h_35 m_5 f_l">
    </div>
    <div class="p_r f_0">
      <img src="{IMG}/playlog/life_perfect.png" class="h_30">
      <div class="playlog_life_block f_r">1/1</div>
    </div>
  </div>
  <form action="https://maimaidx.jp/maimai-mobile/record/playlogDetail/" method="get">
    <input type="hidden" name="idx" value="3,1709640420"></form>
</div>
<div class="p_10 t_l f_0 v_b">
  <div class="playlog_top_container p_r">
    <img src="{IMG}/diff_expert.png" class="playlog_diff v_b">
    <div class="sub_title t_c f_r f_11">
      <span class="red f_b v_b">TRACK 03</span><span class="v_b">2024/03/05 21:03</span></div>
  </div>
  <div class="playlog_expert_container">
    <div class="basic_block m_5 p_5 p_l_10 f_13 break">
      <div class="music_lv_block f_r t_c f_14">11</div>
      Song B
    </div>
    <img src="{IMG}/music_standard.png" class="playlog_music_kind_icon">
    <div class="playlog_achievement_txt t_r">97.<span class="f_20">1200</span>%</div>
    <div class="playlog_result_innerblock">
      <img src="{IMG}/playlog/fc_dummy.png?ver=1.40" class="h_35 m_5 f_l">
    </div>
  </div>
</div>"#
    ))
}

/// A FiNALE archive page with the `all` and `master` counters; counter `n`
/// reads `n / 50`.
pub fn finale_archive_page() -> String {
    let mut statistics = String::new();
    for (id, total) in [("all_cnt", "12,345,678"), ("master_cnt", "987,654")] {
        let _ = writeln!(
            statistics,
            r#"<div id="{id}" class="finale_musiccount_block"><div class="f_16">{total}</div>"#
        );
        for counter in 0..14 {
            let _ = writeln!(
                statistics,
                r#"<div class="musiccount_counter_block f_l">{counter} / 50</div>"#
            );
        }
        statistics.push_str("</div>\n");
    }
    page(&format!(
        r#"<div class="finale_area">
<div class="see_through_block">
  <table><tr><td>1,234</td><td>56</td></tr></table>
</div>
<div class="see_through_block">{statistics}</div>
<div class="basic_block">
  <div class="finale_user_block" style="background-image: url('{IMG}/frame/frame_01.png');">
    <img src="{IMG}/Icon/icon_finale.png" class="finale_icon">
    <img src="{IMG}/NamePlate/plate_01.png" class="finale_nameplate">
    <div class="finale_trophy_inner_block"><span>FiNALE</span></div>
    <div class="finale_username">ＦＩＮＡＬＥ</div>
    <img src="{IMG}/grade/grade_10.png" class="finale_grade">
    <div class="finale_rating">12.34 (MAX 13.05)</div>
    <div class="finale_region_block">REGION 8</div>
    <div class="finale_point_block">3,000 / 12</div>
    <div class="finale_totallv">TOTAL Lv.150 (12)</div>
  </div>
</div>
</div>"#
    ))
}

/// The canonical error page showing `code`.
pub fn error_page(code: u32) -> String {
    page(&format!(
        r#"<div class="container_red p_10">
  <div class="p_5 f_14">ERROR CODE：{code}</div>
  <div class="p_5 f_12 gray break">An error has occurred.</div>
</div>"#
    ))
}

/// An error page announcing maintenance instead of a code.
pub fn maintenance_error_page() -> String {
    page(
        r#"<div class="container_red p_10">
  <div class="p_5 f_14">ただいまメンテナンス中です</div>
  <div class="p_5 f_12 gray break">The service is under maintenance.</div>
</div>"#,
    )
}

/// A login page whose form posts to `action` with a login id field named
/// `user_field`.
pub fn login_page(action: &str, user_field: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>login</title></head><body>
<form action="/maimai-mobile/search/" method="get"><input type="text" name="q"></form>
<form action="{action}" method="post">
  <input type="text" name="{user_field}" value="">
  <input type="password" name="password">
  <input type="hidden" name="token" value="csrf-token">
  <input type="checkbox" name="save_cookie" value="on">
  <button type="submit">login</button>
</form>
</body></html>"#
    )
}
