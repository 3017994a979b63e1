//! Route model and URL builders for the chart's navigation contract.
//!
//! Paths look like `[/timeline/:timeline]/orgchart[/:node]`; every builder
//! preserves the timeline segment so a historical view survives navigation.

/// Org-chart route parameters: an optional timeline plus an optional focused node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartRoute {
	pub time_line: Option<String>,
	pub node: Option<String>,
}

impl ChartRoute {
	pub fn new(time_line: Option<String>, node: Option<String>) -> Self {
		Self { time_line, node }
	}

	/// Parses an org-chart path; `None` for anything else.
	pub fn parse(path: &str) -> Option<Self> {
		let mut segments = path.split('/').filter(|s| !s.is_empty());
		let mut route = ChartRoute::default();
		match segments.next()? {
			"timeline" => {
				route.time_line = Some(segments.next()?.to_string());
				if segments.next()? != "orgchart" {
					return None;
				}
			}
			"orgchart" => {}
			_ => return None,
		}
		route.node = segments.next().map(str::to_string);
		if segments.next().is_some() {
			return None;
		}
		Some(route)
	}
}

/// `/orgchart[/:uid]`, keeping the timeline prefix when one is active.
pub fn org_chart_url(uid: Option<&str>, time_line: Option<&str>) -> String {
	match (uid, time_line) {
		(Some(uid), Some(tl)) => format!("/timeline/{tl}/orgchart/{uid}"),
		(Some(uid), None) => format!("/orgchart/{uid}"),
		(None, Some(tl)) => format!("/timeline/{tl}/orgchart"),
		(None, None) => "/orgchart".to_string(),
	}
}

/// A role's detail page.
pub fn role_url(uid: &str, time_line: Option<&str>) -> String {
	match time_line {
		Some(tl) => format!("/timeline/{tl}/role/{uid}"),
		None => format!("/role/{uid}"),
	}
}

/// A member's profile page.
pub fn member_url(uid: &str, time_line: Option<&str>) -> String {
	match time_line {
		Some(tl) => format!("/timeline/{tl}/member/{uid}"),
		None => format!("/member/{uid}"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builds_urls_with_and_without_timeline() {
		assert_eq!(org_chart_url(None, None), "/orgchart");
		assert_eq!(org_chart_url(Some("abc"), None), "/orgchart/abc");
		assert_eq!(org_chart_url(None, Some("5")), "/timeline/5/orgchart");
		assert_eq!(org_chart_url(Some("abc"), Some("5")), "/timeline/5/orgchart/abc");
		assert_eq!(role_url("r", Some("9")), "/timeline/9/role/r");
		assert_eq!(member_url("m", None), "/member/m");
	}

	#[test]
	fn parses_the_four_chart_path_shapes() {
		assert_eq!(ChartRoute::parse("/orgchart"), Some(ChartRoute::new(None, None)));
		assert_eq!(
			ChartRoute::parse("/orgchart/abc"),
			Some(ChartRoute::new(None, Some("abc".into())))
		);
		assert_eq!(
			ChartRoute::parse("/timeline/5/orgchart"),
			Some(ChartRoute::new(Some("5".into()), None))
		);
		assert_eq!(
			ChartRoute::parse("/timeline/5/orgchart/abc"),
			Some(ChartRoute::new(Some("5".into()), Some("abc".into())))
		);
	}

	#[test]
	fn rejects_foreign_paths() {
		assert_eq!(ChartRoute::parse("/members"), None);
		assert_eq!(ChartRoute::parse("/timeline/5/role/abc"), None);
		assert_eq!(ChartRoute::parse("/orgchart/abc/extra"), None);
		assert_eq!(ChartRoute::parse("/timeline"), None);
	}

	#[test]
	fn url_and_parse_are_inverse() {
		let route = ChartRoute::new(Some("42".into()), Some("node-1".into()));
		let url = org_chart_url(route.node.as_deref(), route.time_line.as_deref());
		assert_eq!(ChartRoute::parse(&url), Some(route));
	}
}
