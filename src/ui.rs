use crate::calendar::{CalendarDay, CalendarView, DayState, YearMonth};
use crate::models::TrackingType;
use crate::view::{DashboardView, FeedbackTone, RoutineView, StatCards};

pub fn render_index(view: &DashboardView) -> String {
    INDEX_HTML
        .replace("{{DATE}}", &view.date.to_string())
        .replace("{{DATE_LABEL}}", &escape_html(&view.date_label))
        .replace("{{BACK_DISABLED}}", disabled(view.can_go_back))
        .replace("{{FORWARD_DISABLED}}", disabled(view.can_go_forward))
        .replace("{{BANNER}}", &render_banner(view.banner.as_deref()))
        .replace("{{STATS}}", &render_stats(view.stats.as_ref()))
        .replace("{{ROUTINES}}", &render_routines(view))
}

pub fn render_calendar(view: &CalendarView) -> String {
    let id = escape_html(view.routine_id.as_str());
    CALENDAR_HTML
        .replace("{{HABIT}}", &escape_html(&view.habit_name))
        .replace("{{TITLE}}", &escape_html(&view.title))
        .replace("{{PREV}}", &month_link(&id, view.previous, "&larr;", "Previous month"))
        .replace("{{NEXT}}", &month_link(&id, view.next, "&rarr;", "Next month"))
        .replace("{{WEEKS}}", &render_weeks(view))
        .replace("{{TOTAL_DAYS}}", &view.stats.total_days.to_string())
        .replace("{{COMPLETED_DAYS}}", &view.stats.completed_days.to_string())
        .replace("{{COMPLETION_RATE}}", &escape_html(&view.completion_rate))
}

fn month_link(id: &str, month: Option<YearMonth>, arrow: &str, label: &str) -> String {
    match month {
        Some(month) => format!(
            r#"<a class="ghost" href="/routines/{id}/calendar?month={month}" aria-label="{label}">{arrow}</a>"#
        ),
        None => String::new(),
    }
}

fn render_weeks(view: &CalendarView) -> String {
    view.weeks
        .iter()
        .map(|week| {
            let cells: String = week
                .iter()
                .map(|cell| match cell {
                    Some(day) => render_day(day),
                    None => r#"<td class="blank"></td>"#.to_string(),
                })
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect()
}

fn render_day(day: &CalendarDay) -> String {
    let state = match day.state {
        DayState::Completed => "completed",
        DayState::Scheduled => "scheduled",
        DayState::Unscheduled => "unscheduled",
    };
    let today = if day.is_today { " today" } else { "" };
    let mut title = format!("{}", day.date);
    if let Some(value) = day.value {
        title.push_str(&format!(" · {value}"));
    }
    if let Some(notes) = &day.notes {
        title.push_str(&format!(" · {notes}"));
    }
    format!(
        r#"<td class="day {state}{today}" data-date="{}" title="{}">{}</td>"#,
        day.date,
        escape_html(&title),
        day.day
    )
}

fn disabled(enabled: bool) -> &'static str {
    if enabled { "" } else { "disabled" }
}

fn render_banner(banner: Option<&str>) -> String {
    match banner {
        Some(message) => format!(r#"<p class="banner" role="alert">{}</p>"#, escape_html(message)),
        None => String::new(),
    }
}

fn render_stats(stats: Option<&StatCards>) -> String {
    let Some(stats) = stats else {
        return String::new();
    };
    let cards = [
        ("active-routines", "Active routines", stats.active_routines.to_string()),
        ("longest-streak", "Longest streak", stats.longest_streak.to_string()),
        ("completed-routines", "Completed routines", stats.completed_routines.to_string()),
        ("completion-rate", "Completion rate", stats.completion_rate.clone()),
        ("consistency", "Consistency", stats.consistency_score.clone()),
    ];
    let body: String = cards
        .iter()
        .map(|(key, label, value)| {
            format!(
                r#"<div class="card"><span class="label">{label}</span><span class="value" data-stat="{key}">{}</span></div>"#,
                escape_html(value)
            )
        })
        .collect();
    format!(r#"<section class="panel">{body}</section>"#)
}

fn render_routines(view: &DashboardView) -> String {
    if view.routines.is_empty() {
        if !view.loaded {
            return String::new();
        }
        return r#"<p class="empty">No active routines yet. Start one to begin your 91 days.</p>"#
            .to_string();
    }
    view.routines.iter().map(render_routine).collect()
}

fn render_routine(routine: &RoutineView) -> String {
    let id = escape_html(routine.id.as_str());
    let strike = if routine.strike_used {
        r#"<span class="badge strike">Strike used</span>"#
    } else {
        ""
    };
    let feedback = match &routine.feedback {
        Some(feedback) => {
            let tone = match feedback.tone {
                FeedbackTone::Confirmation => "ok",
                FeedbackTone::Error => "error",
            };
            format!(r#"<p class="feedback {tone}">{}</p>"#, escape_html(&feedback.message))
        }
        None => String::new(),
    };
    let control = if routine.control.shows_done() {
        format!(
            r#"<form method="post" action="/routines/{id}/uncomplete">
          <span class="done">{}</span>
          <button type="submit" class="ghost">Undo</button>
        </form>"#,
            routine.control.label()
        )
    } else {
        let value = match routine.tracking_type {
            TrackingType::Numeric => format!(
                r#"<input type="number" name="value" step="1" required placeholder="{}" />"#,
                escape_html(routine.numeric_unit.as_deref().unwrap_or("value"))
            ),
            TrackingType::Boolean => String::new(),
        };
        format!(
            r#"<form method="post" action="/routines/{id}/complete">
          {value}
          <input type="text" name="notes" placeholder="How did it go?" />
          <button type="submit">{}</button>
        </form>"#,
            routine.control.label()
        )
    };

    format!(
        r#"<article class="routine" id="routine-{id}">
      <header>
        <h2>{name}</h2>
        <span class="recurrence">{recurrence}</span>
        {strike}
        <a class="calendar-link" href="/routines/{id}/calendar">Calendar</a>
      </header>
      <div class="progress" role="progressbar" aria-valuenow="{percent}" aria-valuemin="0" aria-valuemax="100">
        <div class="bar" style="width: {percent}%"></div>
      </div>
      <p class="meta">{total}/{target} days &middot; {percent}% &middot; {remaining} days remaining</p>
      <p class="meta">Streak {current} &middot; Best {longest}</p>
      {control}
      {feedback}
    </article>"#,
        name = escape_html(&routine.habit_name),
        recurrence = escape_html(&routine.recurrence),
        percent = routine.progress_percent,
        total = routine.total_completions,
        target = routine.target_days,
        remaining = routine.days_remaining,
        current = routine.current_streak,
        longest = routine.longest_streak,
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Plan 91 · Dashboard</title>
  <style>
    :root {
      --bg: #f4f6fb;
      --ink: #1f2933;
      --muted: #616e7c;
      --primary: #3b6ef5;
      --success: #1f9d55;
      --warning: #d97706;
      --danger: #c53030;
      --card: #ffffff;
      --shadow: 0 12px 32px rgba(31, 41, 51, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(880px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    .date-nav {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .date-nav h1 {
      margin: 0;
      font-size: 1.6rem;
    }

    .date-nav time {
      color: var(--muted);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 14px;
    }

    .card,
    .routine {
      background: var(--card);
      border-radius: 16px;
      box-shadow: var(--shadow);
      padding: 18px;
    }

    .card .label {
      display: block;
      color: var(--muted);
      font-size: 0.85rem;
    }

    .card .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .routine header {
      display: flex;
      align-items: baseline;
      gap: 10px;
      flex-wrap: wrap;
    }

    .routine h2 {
      margin: 0;
      font-size: 1.2rem;
    }

    .recurrence,
    .meta {
      color: var(--muted);
      font-size: 0.9rem;
    }

    .badge.strike {
      background: #fef3c7;
      color: var(--warning);
      border-radius: 999px;
      padding: 2px 10px;
      font-size: 0.8rem;
    }

    .progress {
      height: 10px;
      background: #e4e7eb;
      border-radius: 999px;
      overflow: hidden;
      margin: 14px 0 8px;
    }

    .progress .bar {
      height: 100%;
      background: linear-gradient(90deg, var(--primary), var(--success));
    }

    form {
      display: flex;
      gap: 8px;
      flex-wrap: wrap;
      align-items: center;
    }

    input {
      border: 1px solid #cbd2d9;
      border-radius: 10px;
      padding: 10px 12px;
      font: inherit;
    }

    button {
      border: none;
      border-radius: 10px;
      padding: 10px 18px;
      font: inherit;
      font-weight: 600;
      color: #fff;
      background: var(--primary);
      cursor: pointer;
    }

    button.ghost {
      background: transparent;
      color: var(--muted);
      border: 1px solid #cbd2d9;
    }

    button:disabled {
      opacity: 0.4;
      cursor: not-allowed;
    }

    .done {
      color: var(--success);
      font-weight: 600;
    }

    .banner {
      margin: 0;
      padding: 12px 16px;
      border-radius: 12px;
      background: #fde8e8;
      color: var(--danger);
    }

    .feedback {
      margin: 10px 0 0;
      font-size: 0.9rem;
    }

    .feedback.ok {
      color: var(--success);
    }

    .feedback.error {
      color: var(--danger);
    }

    .empty {
      color: var(--muted);
      text-align: center;
    }
  </style>
</head>
<body>
  <main class="app">
    <nav class="date-nav">
      <form method="post" action="/date/back">
        <button type="submit" class="ghost" aria-label="Previous day" {{BACK_DISABLED}}>&larr;</button>
      </form>
      <div>
        <h1>{{DATE_LABEL}}</h1>
        <time datetime="{{DATE}}">{{DATE}}</time>
      </div>
      <form method="post" action="/date/forward">
        <button type="submit" class="ghost" aria-label="Next day" {{FORWARD_DISABLED}}>&rarr;</button>
      </form>
    </nav>
    {{BANNER}}
    {{STATS}}
    <section class="routines" id="routines-container">
      {{ROUTINES}}
    </section>
  </main>
</body>
</html>
"#;

const CALENDAR_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Plan 91 · {{HABIT}}</title>
  <style>
    body {
      margin: 0;
      background: #f4f6fb;
      color: #1f2933;
      font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(560px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 18px;
    }

    .month-nav {
      display: flex;
      align-items: center;
      justify-content: space-between;
    }

    .month-nav h1 {
      margin: 0;
      font-size: 1.4rem;
    }

    a.ghost {
      color: #616e7c;
      text-decoration: none;
      border: 1px solid #cbd2d9;
      border-radius: 10px;
      padding: 6px 14px;
    }

    table {
      width: 100%;
      border-collapse: separate;
      border-spacing: 4px;
      background: #fff;
      border-radius: 16px;
      padding: 12px;
    }

    th {
      font-size: 0.75rem;
      color: #616e7c;
    }

    td.day {
      text-align: center;
      padding: 10px 0;
      border-radius: 8px;
    }

    td.completed {
      background: #1f9d55;
      color: #fff;
      font-weight: 600;
    }

    td.scheduled {
      border: 2px solid #3b6ef5;
    }

    td.unscheduled {
      background: #f0f2f5;
      color: #9aa5b1;
    }

    td.today {
      outline: 2px solid #7c3aed;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      text-align: center;
    }

    .stats strong {
      display: block;
      font-size: 1.4rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <a href="/">&larr; Dashboard</a>
    <h2>{{HABIT}}</h2>
    <nav class="month-nav">
      {{PREV}}
      <h1>{{TITLE}}</h1>
      {{NEXT}}
    </nav>
    <table>
      <thead>
        <tr><th>Sun</th><th>Mon</th><th>Tue</th><th>Wed</th><th>Thu</th><th>Fri</th><th>Sat</th></tr>
      </thead>
      <tbody>
        {{WEEKS}}
      </tbody>
    </table>
    <section class="stats">
      <div><strong data-stat="total-days">{{TOTAL_DAYS}}</strong>Days in month</div>
      <div><strong data-stat="completed-days">{{COMPLETED_DAYS}}</strong>Completed</div>
      <div><strong data-stat="calendar-rate">{{COMPLETION_RATE}}</strong>Completion rate</div>
    </section>
  </main>
</body>
</html>
"#;
