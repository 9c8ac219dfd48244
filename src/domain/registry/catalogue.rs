//! Static topic catalogue: five topics per domain.

use crate::domain::foundation::DomainArea;

use super::Topic;

pub(super) const TOPICS: &[Topic] = &[
    // Market
    Topic {
        id: "target_customer",
        label: "Target customer",
        domain: DomainArea::Market,
        requirements: &[
            "Clearly defined customer segment in the new market",
            "Evidence of the pain point being solved",
        ],
        critical: false,
    },
    Topic {
        id: "market_size",
        label: "Market size",
        domain: DomainArea::Market,
        requirements: &[
            "Addressable market estimate",
            "Source or method behind the estimate",
        ],
        critical: false,
    },
    Topic {
        id: "competitive_landscape",
        label: "Competitive landscape",
        domain: DomainArea::Market,
        requirements: &["Named local competitors", "Basis of differentiation"],
        critical: false,
    },
    Topic {
        id: "customer_validation",
        label: "Customer validation",
        domain: DomainArea::Market,
        requirements: &[
            "Interviews, pilots or paying customers in the target market",
            "Quantified demand signals",
        ],
        critical: true,
    },
    Topic {
        id: "market_timing",
        label: "Market timing",
        domain: DomainArea::Market,
        requirements: &["Why now", "Trends or triggers supporting entry"],
        critical: false,
    },
    // Product
    Topic {
        id: "value_proposition",
        label: "Value proposition",
        domain: DomainArea::Product,
        requirements: &[
            "Core benefit stated in customer terms",
            "Proof that customers value it",
        ],
        critical: true,
    },
    Topic {
        id: "product_maturity",
        label: "Product maturity",
        domain: DomainArea::Product,
        requirements: &["Current product stage", "Usage or retention evidence"],
        critical: false,
    },
    Topic {
        id: "product_roadmap",
        label: "Product roadmap",
        domain: DomainArea::Product,
        requirements: &["Planned changes for the new market", "Delivery timeline"],
        critical: false,
    },
    Topic {
        id: "technical_feasibility",
        label: "Technical feasibility",
        domain: DomainArea::Product,
        requirements: &["Localization or scaling constraints", "Known technical risks"],
        critical: false,
    },
    Topic {
        id: "intellectual_property",
        label: "Intellectual property",
        domain: DomainArea::Product,
        requirements: &["Protection in the target jurisdiction", "Freedom to operate"],
        critical: false,
    },
    // Go-to-market
    Topic {
        id: "sales_channels",
        label: "Sales channels",
        domain: DomainArea::GoToMarket,
        requirements: &["Primary channel to reach customers", "Channel economics"],
        critical: false,
    },
    Topic {
        id: "pricing_strategy",
        label: "Pricing strategy",
        domain: DomainArea::GoToMarket,
        requirements: &["Price points for the new market", "Willingness-to-pay evidence"],
        critical: false,
    },
    Topic {
        id: "customer_acquisition",
        label: "Customer acquisition",
        domain: DomainArea::GoToMarket,
        requirements: &["Acquisition plan", "Expected acquisition cost"],
        critical: true,
    },
    Topic {
        id: "partnerships",
        label: "Partnerships",
        domain: DomainArea::GoToMarket,
        requirements: &["Distribution or local partners", "Status of partner agreements"],
        critical: false,
    },
    Topic {
        id: "launch_plan",
        label: "Launch plan",
        domain: DomainArea::GoToMarket,
        requirements: &["Launch milestones", "Success criteria"],
        critical: false,
    },
    // Operations
    Topic {
        id: "team_capabilities",
        label: "Team capabilities",
        domain: DomainArea::Operations,
        requirements: &["Who will run the expansion", "Relevant market experience"],
        critical: true,
    },
    Topic {
        id: "hiring_plan",
        label: "Hiring plan",
        domain: DomainArea::Operations,
        requirements: &["Roles to fill", "Hiring timeline"],
        critical: false,
    },
    Topic {
        id: "key_processes",
        label: "Key processes",
        domain: DomainArea::Operations,
        requirements: &["Delivery and support processes", "Readiness to scale them"],
        critical: false,
    },
    Topic {
        id: "vendor_dependencies",
        label: "Vendor dependencies",
        domain: DomainArea::Operations,
        requirements: &["Critical suppliers", "Contingency options"],
        critical: false,
    },
    Topic {
        id: "regulatory_compliance",
        label: "Regulatory compliance",
        domain: DomainArea::Operations,
        requirements: &["Applicable regulations", "Licensing or certification status"],
        critical: true,
    },
    // Financials
    Topic {
        id: "revenue_model",
        label: "Revenue model",
        domain: DomainArea::Financials,
        requirements: &["How the expansion makes money", "Revenue to date"],
        critical: false,
    },
    Topic {
        id: "unit_economics",
        label: "Unit economics",
        domain: DomainArea::Financials,
        requirements: &["Contribution margin per customer", "Payback period"],
        critical: true,
    },
    Topic {
        id: "funding_status",
        label: "Funding status",
        domain: DomainArea::Financials,
        requirements: &["Capital committed to the expansion", "Source of funds"],
        critical: false,
    },
    Topic {
        id: "cash_runway",
        label: "Cash runway",
        domain: DomainArea::Financials,
        requirements: &["Months of runway", "Burn rate during expansion"],
        critical: true,
    },
    Topic {
        id: "financial_projections",
        label: "Financial projections",
        domain: DomainArea::Financials,
        requirements: &["Revenue and cost projections", "Break-even point"],
        critical: false,
    },
];
