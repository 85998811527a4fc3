/// One page of the first-run tutorial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorialStep {
    pub title: &'static str,
    pub content: &'static [&'static str],
}

pub const TUTORIAL_STEPS: &[TutorialStep] = &[
    TutorialStep {
        title: "Welcome to the Drug Overdose Crisis Tracker",
        content: &[
            "This interactive tool helps you understand drug overdose trends across U.S. counties",
            "Search for and compare counties",
            "Explore how risks vary across the country",
            "See how political factors correlate with overdose rates",
        ],
    },
    TutorialStep {
        title: "Interactive Map Features",
        content: &[
            "Hover over any county to see detailed statistics",
            "The map shows county-level data colored by drug overdose rates",
            "Darker purple indicates higher overdose rates (higher percentile)",
            "Use the year slider to see trends from 2018-2023",
        ],
    },
    TutorialStep {
        title: "Search and Compare Counties",
        content: &[
            "Use the search bar to find specific counties",
            "Click \"Compare Counties\" to analyze two counties side-by-side",
            "View time-series trends and demographic comparisons",
            "Apply statistical controls for poverty, income, and urban/rural status",
        ],
    },
    TutorialStep {
        title: "County Details",
        content: &[
            "Click on any county to view detailed information",
            "Access comprehensive reports with graphs and trends",
            "Share or download county-specific data",
            "Compare against state and national averages",
        ],
    },
];
