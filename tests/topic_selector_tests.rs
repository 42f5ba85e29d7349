mod common;

use news_bias_ai::features::news::{Article, Outlet};
use news_bias_ai::features::topics::TopicSelector;

use common::{article, overlapping_articles, test_config};

fn all_articles() -> Vec<Article> {
    let (mut liberal, conservative) = overlapping_articles();
    liberal.extend(conservative);
    liberal
}

#[test]
fn three_shared_stories_yield_three_topics() {
    let selector = TopicSelector::from_config(&test_config(&[]));

    let topics = selector.select(&all_articles());

    assert_eq!(topics.len(), 3);
    for topic in &topics {
        assert!(topic.is_comparable());
        assert!(topic.liberal_articles.iter().all(|a| a.source == Outlet::Liberal));
        assert!(topic.conservative_articles.iter().all(|a| a.source == Outlet::Conservative));
    }

    let labels: Vec<&str> = topics.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Senate passes border security funding bill",
            "Supreme Court hears tariff challenge from small businesses",
            "Governor race tightens in Georgia polling",
        ]
    );
}

#[test]
fn selection_is_independent_of_input_order() {
    let selector = TopicSelector::new(0.2, 5);
    let articles = all_articles();
    let expected = selector.select(&articles);

    let mut reversed = articles.clone();
    reversed.reverse();
    assert_eq!(selector.select(&reversed), expected);

    let mut rotated = articles.clone();
    rotated.rotate_left(7);
    assert_eq!(selector.select(&rotated), expected);
}

#[test]
fn never_returns_more_than_five_topics() {
    let mut articles = Vec::new();
    for index in 0..8 {
        let subject = format!("subject{index}alpha subject{index}beta subject{index}gamma");
        articles.push(article(
            Outlet::Liberal,
            &format!("{subject} debate"),
            &subject,
            index,
        ));
        articles.push(article(
            Outlet::Conservative,
            &format!("{subject} dispute"),
            &subject,
            index,
        ));
    }

    let topics = TopicSelector::new(0.2, 12).select(&articles);

    assert_eq!(topics.len(), 5);
    assert!(topics.iter().all(|topic| topic.is_comparable()));
}

#[test]
fn one_sided_stories_are_never_used_as_padding() {
    let articles = vec![
        article(Outlet::Liberal, "Budget deal collapses in House", "Budget talks collapse", 1),
        article(Outlet::Liberal, "Budget deal collapse blamed on leaders", "Budget talks collapse", 2),
        article(Outlet::Conservative, "Drone sightings alarm farmers", "Unexplained drones", 1),
    ];

    let topics = TopicSelector::new(0.2, 5).select(&articles);

    assert!(topics.is_empty());
}

#[test]
fn larger_stories_rank_first() {
    let articles = vec![
        article(Outlet::Liberal, "Rail strike talks resume", "Rail unions strike talks", 1),
        article(Outlet::Conservative, "Rail strike talks restart", "Rail unions strike talks", 1),
        article(Outlet::Liberal, "Hurricane relief vote delayed", "Hurricane relief funding vote", 5),
        article(Outlet::Liberal, "Hurricane relief vote slips again", "Hurricane relief funding vote", 6),
        article(Outlet::Conservative, "Hurricane relief vote stalls", "Hurricane relief funding vote", 7),
    ];

    let topics = TopicSelector::new(0.2, 5).select(&articles);

    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0].label, "Hurricane relief vote delayed");
    assert_eq!(topics[0].liberal_articles.len(), 2);
    assert_eq!(topics[0].liberal_articles[0].title, "Hurricane relief vote delayed");
    assert_eq!(topics[1].label, "Rail strike talks resume");
}

#[test]
fn single_outlet_selection_ranks_one_sided_stories() {
    let articles = vec![
        article(Outlet::Liberal, "Wildfire smoke prompts health advisories", "Air quality alerts", 4),
        article(Outlet::Liberal, "Budget deal collapse blamed on leaders", "Budget talks collapse", 2),
        article(Outlet::Liberal, "Drone sightings alarm farmers", "Unexplained drones", 3),
        article(Outlet::Liberal, "Budget deal collapses in House", "Budget talks collapse", 1),
    ];
    let selector = TopicSelector::new(0.2, 2);

    assert!(selector.select(&articles).is_empty());

    let topics = selector.select_single_outlet(&articles);

    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0].label, "Budget deal collapses in House");
    assert_eq!(topics[0].liberal_articles.len(), 2);
    assert_eq!(topics[1].label, "Drone sightings alarm farmers");
    assert!(topics.iter().all(|topic| topic.single_outlet() == Some(Outlet::Liberal)));
}
